//! Application layer for imgchat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ConversationConfig;
pub use ports::{
    chat_provider::{ChatProvider, ChatRequest, ProviderError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    image_fetcher::{FetchError, ImageFetcher},
    session_store::{SessionStore, StoreError},
};
pub use use_cases::ask_about_image::{AskAboutImageUseCase, AskInput};
pub use use_cases::error::{ConversationError, ErrorCategory};
pub use use_cases::manage_conversations::ManageConversationsUseCase;
