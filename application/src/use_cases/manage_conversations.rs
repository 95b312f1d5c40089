//! Manage Conversations use case.
//!
//! Read and delete operations over a user's sessions: the detail view of one
//! conversation, the list of conversations with activity, and clearing one
//! or all of them.

use crate::ports::session_store::SessionStore;
use crate::use_cases::error::ConversationError;
use imgchat_domain::{ConversationDetail, ConversationSession, SubjectUrl, UserId};
use std::sync::Arc;
use tracing::info;

/// Query and cleanup operations on stored conversations.
#[derive(Clone)]
pub struct ManageConversationsUseCase {
    store: Arc<dyn SessionStore>,
}

impl ManageConversationsUseCase {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The conversation about `subject_url` with all of its messages.
    ///
    /// Creates an empty session when none exists yet, matching the ask path,
    /// so viewing a fresh conversation is never an error.
    pub async fn get_detail(
        &self,
        user: &UserId,
        subject_url: &str,
    ) -> Result<ConversationDetail, ConversationError> {
        let subject = SubjectUrl::try_new(subject_url)?;
        let session = self.store.get_or_create(user, &subject).await?;
        let messages = self.store.messages(&session).await?;
        Ok(ConversationDetail { session, messages })
    }

    /// Sessions with at least one message, most recent first
    pub async fn list_summaries(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationSession>, ConversationError> {
        Ok(self.store.list_non_empty(user).await?)
    }

    /// Delete all messages of one conversation, keeping the session.
    ///
    /// Fails with [`ConversationError::NotFound`] if the user has no session
    /// for `subject_url`.
    pub async fn clear(&self, user: &UserId, subject_url: &str) -> Result<u64, ConversationError> {
        let subject = SubjectUrl::try_new(subject_url)?;
        let session = self
            .store
            .find(user, &subject)
            .await?
            .ok_or_else(|| ConversationError::NotFound(subject.to_string()))?;

        let removed = self.store.delete_messages(&session).await?;
        info!(session = %session.id(), removed, "Cleared conversation history");
        Ok(removed)
    }

    /// Delete every session owned by the user. A user without sessions is a
    /// successful no-op.
    pub async fn clear_all(&self, user: &UserId) -> Result<u64, ConversationError> {
        let removed = self.store.delete_all_sessions(user).await?;
        info!(user = %user, removed, "Deleted all conversations");
        Ok(removed)
    }
}
