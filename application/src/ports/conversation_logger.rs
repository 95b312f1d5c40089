//! Port for the conversation transcript.
//!
//! Each ask ends in exactly one [`ConversationEvent`]. The transcript is a
//! machine-readable record kept apart from `tracing` diagnostics.

use crate::use_cases::error::ErrorCategory;
use serde::Serialize;

/// Outcome of one ask, as recorded in the transcript.
///
/// Serializes with a `type` tag of `ask_completed` or `ask_failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    AskCompleted {
        user: String,
        subject_url: String,
        provider: String,
        reply: String,
    },
    AskFailed {
        user: String,
        subject_url: String,
        provider: String,
        category: ErrorCategory,
        error: String,
    },
}

impl ConversationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ConversationEvent::AskCompleted { .. } => "ask_completed",
            ConversationEvent::AskFailed { .. } => "ask_failed",
        }
    }
}

/// Sink for conversation events.
///
/// Synchronous and infallible: a logging failure must never fail an ask.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Used when no transcript is configured.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_event_serializes_with_type_tag() {
        let event = ConversationEvent::AskFailed {
            user: "alice".to_string(),
            subject_url: "https://img.example/dog.jpg".to_string(),
            provider: "gemini".to_string(),
            category: ErrorCategory::RateLimited,
            error: "quota".to_string(),
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "ask_failed");
        assert_eq!(value["category"], "rate_limited");
        assert_eq!(event.kind(), "ask_failed");
    }
}
