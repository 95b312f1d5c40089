//! Bedrock chat provider
//!
//! The Converse API is stateless, so the stored history is replayed on
//! every call followed by the new prompt and image.

use super::types;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::types as bedrock;
use imgchat_application::ports::chat_provider::{ChatProvider, ChatRequest, ProviderError};
use imgchat_domain::Turn;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_BEDROCK_MODEL: &str = "anthropic.claude-sonnet-4-5-20250929-v1:0";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";

pub struct BedrockChatProvider {
    client: Arc<BedrockClient>,
    model_id: String,
    max_tokens: i32,
}

impl BedrockChatProvider {
    /// Create a provider, resolving AWS credentials from the default chain.
    pub async fn new(
        region: &str,
        profile: Option<&str>,
        model_id: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let aws_config = loader.load().await;

        let model_id = model_id.into();
        info!(region, model = %model_id, "Bedrock provider initialized");

        Self {
            client: Arc::new(BedrockClient::new(&aws_config)),
            model_id,
            max_tokens: i32::try_from(max_tokens).unwrap_or(i32::MAX),
        }
    }
}

#[async_trait]
impl ChatProvider for BedrockChatProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(
        &self,
        history: &[Turn],
        request: &ChatRequest,
    ) -> Result<String, ProviderError> {
        let mut messages = history
            .iter()
            .map(types::convert_turn)
            .collect::<Result<Vec<_>, _>>()?;
        messages.push(types::convert_turn(&request.to_turn())?);

        debug!(
            model = %self.model_id,
            messages = messages.len(),
            "Calling Bedrock Converse API"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .set_messages(Some(messages))
            .inference_config(
                bedrock::InferenceConfiguration::builder()
                    .max_tokens(self.max_tokens)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| types::convert_converse_error(&e))?;

        let output = response.output().ok_or(ProviderError::EmptyReply)?;
        let text = types::output_text(output);
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyReply);
        }
        Ok(text)
    }

    async fn available_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![self.model_id.clone()])
    }
}
