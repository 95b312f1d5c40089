//! Conversation error taxonomy.
//!
//! Every failure of the ask, get and clear operations is reported as exactly
//! one [`ConversationError`]. None of them is retried internally; the
//! [`ErrorCategory`] tells the boundary what kind of signal to give the caller.

use crate::ports::image_fetcher::FetchError;
use crate::ports::session_store::StoreError;
use imgchat_domain::DomainError;
use imgchat_domain::util::preview;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest provider message echoed back to the caller.
const MAX_PROVIDER_MESSAGE: usize = 200;

/// Coarse classification of a conversation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller must fix the input
    Validation,
    /// Referenced session does not exist
    NotFound,
    /// Provider quota exhausted; back off and retry later
    RateLimited,
    /// Image host or provider failed
    Upstream,
    /// Persistence or unexpected failure
    Internal,
}

impl ErrorCategory {
    /// Whether the same request may succeed if retried later
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::RateLimited | ErrorCategory::Upstream)
    }
}

/// Errors returned by the conversation use cases
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("No conversation for {0}")]
    NotFound(String),

    #[error("Image fetch failed: {0}")]
    UpstreamFetchFailed(#[source] FetchError),

    #[error("Provider rate limited: {0}")]
    RateLimited(String),

    #[error("Provider error: {0}")]
    UpstreamProviderError(String),

    #[error("Internal failure: {0}")]
    InternalFailure(String),
}

impl From<StoreError> for ConversationError {
    fn from(err: StoreError) -> Self {
        ConversationError::InternalFailure(err.to_string())
    }
}

impl ConversationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConversationError::InvalidRequest(_) => ErrorCategory::Validation,
            ConversationError::NotFound(_) => ErrorCategory::NotFound,
            ConversationError::UpstreamFetchFailed(_) => ErrorCategory::Upstream,
            ConversationError::RateLimited(_) => ErrorCategory::RateLimited,
            ConversationError::UpstreamProviderError(_) => ErrorCategory::Upstream,
            ConversationError::InternalFailure(_) => ErrorCategory::Internal,
        }
    }

    /// Short caller-facing message.
    ///
    /// Store and transport internals stay in the logs; only the provider's
    /// own message is echoed, shortened.
    pub fn user_message(&self) -> String {
        match self {
            ConversationError::InvalidRequest(e) => format!("Invalid request: {}", e),
            ConversationError::NotFound(_) => "No conversation found for this image".to_string(),
            ConversationError::UpstreamFetchFailed(_) => {
                "Could not download the image, please try again later".to_string()
            }
            ConversationError::RateLimited(_) => {
                "AI service quota exhausted (429), please try again later".to_string()
            }
            ConversationError::UpstreamProviderError(msg) => {
                format!("AI service error: {}", preview(msg, MAX_PROVIDER_MESSAGE))
            }
            ConversationError::InternalFailure(_) => {
                "Internal error while processing the conversation".to_string()
            }
        }
    }
}
