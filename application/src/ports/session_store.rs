//! Session Store port
//!
//! Durable storage for conversation sessions and their ordered messages.
//! Every operation is scoped to the owning user: a session handle obtained
//! for one user never reads or mutates another user's rows.

use async_trait::async_trait;
use imgchat_domain::{ConversationMessage, ConversationSession, Role, SubjectUrl, UserId};
use thiserror::Error;

/// Errors raised by a session store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Session {0} no longer exists")]
    MissingSession(i64),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

/// Persistence for conversation sessions and messages
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the session for `(user, subject)`, creating it if absent.
    ///
    /// Idempotent: concurrent or repeated calls for the same pair resolve to
    /// the same session.
    async fn get_or_create(
        &self,
        user: &UserId,
        subject: &SubjectUrl,
    ) -> Result<ConversationSession, StoreError>;

    /// Look up an existing session without creating one
    async fn find(
        &self,
        user: &UserId,
        subject: &SubjectUrl,
    ) -> Result<Option<ConversationSession>, StoreError>;

    /// All messages of a session, oldest first
    async fn messages(
        &self,
        session: &ConversationSession,
    ) -> Result<Vec<ConversationMessage>, StoreError>;

    /// Sessions owning at least one message, most recent first
    async fn list_non_empty(&self, user: &UserId) -> Result<Vec<ConversationSession>, StoreError>;

    /// Append a single message to a session
    async fn append_message(
        &self,
        session: &ConversationSession,
        role: Role,
        content: &str,
    ) -> Result<ConversationMessage, StoreError>;

    /// Append a `user` prompt followed by its `model` reply.
    ///
    /// Both rows are written or neither is.
    async fn append_exchange(
        &self,
        session: &ConversationSession,
        prompt: &str,
        reply: &str,
    ) -> Result<(ConversationMessage, ConversationMessage), StoreError>;

    /// Delete every message of a session, keeping the session. Returns the
    /// number of messages removed.
    async fn delete_messages(&self, session: &ConversationSession) -> Result<u64, StoreError>;

    /// Delete every session (and its messages) owned by `user`. Returns the
    /// number of sessions removed; zero is not an error.
    async fn delete_all_sessions(&self, user: &UserId) -> Result<u64, StoreError>;
}
