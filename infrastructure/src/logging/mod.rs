//! Structured conversation transcript.
//!
//! Provides [`JsonlConversationLogger`], which implements the
//! [`ConversationLogger`](imgchat_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
