//! Presentation layer for imgchat
//!
//! This crate contains the conversation boundary (controller and DTOs),
//! CLI definitions and output formatters.

pub mod api;
pub mod cli;
pub mod controller;
pub mod output;

// Re-export commonly used types
pub use api::{AskRequest, AskResponse, ErrorResponse, ResponseBody};
pub use cli::commands::{Cli, Command};
pub use controller::{ConversationController, Outcome, StatusCategory};
pub use output::console::ConsoleFormatter;
pub use output::formatter::{JsonFormatter, OutputFormatter};
