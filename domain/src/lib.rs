//! Domain layer for imgchat
//!
//! This crate contains the core entities and value objects of a per-image
//! conversation. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! - **Session**: binds one user to one subject image; unique per pair
//! - **Message**: an ordered, role-tagged entry in a session (`user` | `model`)
//! - **Turn**: the provider-facing shape of a message
//! - **Projection**: the pure mapping from stored messages to turns

pub mod conversation;
pub mod core;
pub mod util;

// Re-export commonly used types
pub use conversation::{
    entities::{
        ConversationDetail, ConversationMessage, ConversationSession, MessageId, Role, SessionId,
    },
    projection::project_history,
    turn::{DEFAULT_IMAGE_MIME_TYPE, ImageAttachment, Part, Turn, TurnRole},
};
pub use core::{
    error::DomainError,
    identity::{SubjectUrl, UserId},
    prompt::Prompt,
};
