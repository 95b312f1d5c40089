//! Ask About Image use case.
//!
//! The conversation orchestrator. One invocation makes a single attempt:
//!
//! 1. Validate subject and prompt
//! 2. Resolve (get-or-create) the session
//! 3. Project the stored history into provider turns
//! 4. Fetch the image (bounded by `fetch_timeout`)
//! 5. Call the provider with history + prompt + image (bounded by `provider_timeout`)
//! 6. Map the provider outcome onto [`ConversationError`]
//! 7. Persist the `user`/`model` pair
//! 8. Return the reply text
//!
//! No step is retried. Two concurrent asks on the same session are not
//! serialized; their message pairs land in write order.

use crate::config::ConversationConfig;
use crate::ports::chat_provider::{ChatProvider, ChatRequest, ProviderError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::image_fetcher::{FetchError, ImageFetcher};
use crate::ports::session_store::SessionStore;
use crate::use_cases::error::ConversationError;
use imgchat_domain::util::preview;
use imgchat_domain::{ImageAttachment, Prompt, SubjectUrl, Turn, UserId, project_history};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Input for the [`AskAboutImageUseCase`].
#[derive(Debug, Clone)]
pub struct AskInput {
    /// The authenticated caller.
    pub user: UserId,
    /// URL of the image the question is about.
    pub subject_url: String,
    /// The question.
    pub prompt: String,
}

impl AskInput {
    pub fn new(user: UserId, subject_url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            user,
            subject_url: subject_url.into(),
            prompt: prompt.into(),
        }
    }
}

/// Use case for asking the model about an image within a persistent conversation.
#[derive(Clone)]
pub struct AskAboutImageUseCase {
    store: Arc<dyn SessionStore>,
    fetcher: Arc<dyn ImageFetcher>,
    provider: Arc<dyn ChatProvider>,
    config: ConversationConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl AskAboutImageUseCase {
    pub fn new(
        store: Arc<dyn SessionStore>,
        fetcher: Arc<dyn ImageFetcher>,
        provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            store,
            fetcher,
            provider,
            config: ConversationConfig::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_config(mut self, config: ConversationConfig) -> Self {
        self.config = config;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Ask a question about an image, returning the model's reply.
    ///
    /// Returns exactly one of: the new reply text, or one typed error.
    pub async fn execute(&self, input: AskInput) -> Result<String, ConversationError> {
        let user = input.user.clone();
        let subject_url = input.subject_url.clone();

        let result = self.run(input).await;

        let event = match &result {
            Ok(reply) => ConversationEvent::AskCompleted {
                user: user.as_str().to_string(),
                subject_url,
                provider: self.provider.name().to_string(),
                reply: reply.clone(),
            },
            Err(e) => ConversationEvent::AskFailed {
                user: user.as_str().to_string(),
                subject_url,
                provider: self.provider.name().to_string(),
                category: e.category(),
                error: e.to_string(),
            },
        };
        self.conversation_logger.log(event);

        result
    }

    async fn run(&self, input: AskInput) -> Result<String, ConversationError> {
        let subject = SubjectUrl::try_new(input.subject_url)?;
        let prompt = Prompt::try_new(input.prompt)?;

        info!(
            user = %input.user,
            subject = %subject,
            "Ask: {}",
            preview(prompt.content(), 100)
        );

        let session = self.store.get_or_create(&input.user, &subject).await?;
        let history = project_history(&self.store.messages(&session).await?);

        debug!(session = %session.id(), turns = history.len(), "Projected history");

        let image = self.fetch_image(&subject).await?;
        let request = ChatRequest::new(prompt.content(), image);
        let reply = self.invoke_provider(&history, &request).await?;

        self.store
            .append_exchange(&session, prompt.content(), &reply)
            .await
            .map_err(|e| {
                // The provider already answered (and billed) but the turn is lost.
                error!(
                    session = %session.id(),
                    provider = self.provider.name(),
                    "Failed to persist answered exchange: {}",
                    e
                );
                ConversationError::from(e)
            })?;

        info!(
            session = %session.id(),
            reply_bytes = reply.len(),
            "Ask completed"
        );

        Ok(reply)
    }

    async fn fetch_image(&self, subject: &SubjectUrl) -> Result<ImageAttachment, ConversationError> {
        let fetched = tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(subject))
            .await
            .unwrap_or(Err(FetchError::Timeout));

        match fetched {
            Ok(image) => {
                debug!(bytes = image.len(), mime = %image.mime_type, "Fetched image");
                Ok(image)
            }
            Err(e) => {
                warn!(subject = %subject, "Image fetch failed: {}", e);
                Err(ConversationError::UpstreamFetchFailed(e))
            }
        }
    }

    async fn invoke_provider(
        &self,
        history: &[Turn],
        request: &ChatRequest,
    ) -> Result<String, ConversationError> {
        let outcome = tokio::time::timeout(
            self.config.provider_timeout,
            self.provider.complete(history, request),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout));

        match outcome {
            Ok(reply) if reply.trim().is_empty() => {
                warn!(provider = self.provider.name(), "Provider returned an empty reply");
                Err(ConversationError::UpstreamProviderError(
                    ProviderError::EmptyReply.to_string(),
                ))
            }
            Ok(reply) => Ok(reply),
            Err(ProviderError::RateLimited(msg)) => {
                warn!(provider = self.provider.name(), "Provider quota exceeded: {}", msg);
                Err(ConversationError::RateLimited(msg))
            }
            Err(e) => {
                error!(provider = self.provider.name(), "Provider call failed: {}", e);
                Err(ConversationError::UpstreamProviderError(e.to_string()))
            }
        }
    }
}
