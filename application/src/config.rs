//! Application-level configuration.
//!
//! Controls how the conversation use cases bound their calls to the two
//! slow upstreams: the image fetch and the chat provider.

use std::time::Duration;

/// Default bound on a single image fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Conversation behavior configuration.
///
/// A call that exceeds its bound is treated as failed, not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationConfig {
    /// Maximum time to wait for the subject image.
    pub fetch_timeout: Duration,
    /// Maximum time to wait for the provider's reply.
    pub provider_timeout: Duration,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl ConversationConfig {
    /// Creates a config from timeouts in seconds.
    pub fn from_timeout_seconds(fetch_seconds: u64, provider_seconds: u64) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(fetch_seconds),
            provider_timeout: Duration::from_secs(provider_seconds),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}
