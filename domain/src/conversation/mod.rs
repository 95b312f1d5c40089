//! Conversation domain.
//!
//! - [`entities::ConversationSession`]: one user's conversation about one image
//! - [`entities::ConversationMessage`]: a single persisted message within a session
//! - [`turn::Turn`]: a role-tagged unit of content in the provider's shape
//! - [`projection::project_history`]: persisted messages → provider turns

pub mod entities;
pub mod projection;
pub mod turn;
