//! Chat Provider port
//!
//! Narrow interface to an external multimodal chat model: projected history
//! plus one new text-and-image turn in, reply text or a typed error out.
//! Each call is stateless and single-shot; nothing is streamed.

use async_trait::async_trait;
use imgchat_domain::{ImageAttachment, Part, Turn, TurnRole};
use thiserror::Error;

/// Errors that can occur while calling a chat provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider returned no text")]
    EmptyReply,

    #[error("Timeout")]
    Timeout,
}

impl ProviderError {
    /// Whether the provider refused the call because a quota was exhausted
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

/// The new content sent alongside the history
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub prompt: String,
    pub image: ImageAttachment,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, image: ImageAttachment) -> Self {
        Self {
            prompt: prompt.into(),
            image,
        }
    }

    /// The request as a user turn: prompt text first, then the image
    pub fn to_turn(&self) -> Turn {
        Turn {
            role: TurnRole::User,
            parts: vec![Part::text(self.prompt.clone()), self.image.to_part()],
        }
    }
}

/// An external multimodal chat completion provider
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Continue `history` with the new prompt and image, returning the reply text
    async fn complete(&self, history: &[Turn], request: &ChatRequest)
    -> Result<String, ProviderError>;

    /// Models the provider can serve. Providers without a listing endpoint
    /// return an empty list.
    async fn available_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_turn_has_text_then_image() {
        let request = ChatRequest::new("breed?", ImageAttachment::new(vec![1, 2], "image/png"));
        let turn = request.to_turn();
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.parts.len(), 2);
        assert_eq!(turn.parts[0], Part::text("breed?"));
        assert!(matches!(
            &turn.parts[1],
            Part::InlineImage { mime_type, data } if mime_type == "image/png" && data == &vec![1, 2]
        ));
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(ProviderError::RateLimited("429".into()).is_rate_limited());
        assert!(!ProviderError::Timeout.is_rate_limited());
    }
}
