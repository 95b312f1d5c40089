//! Chat provider adapters and the factory that picks one from config.

pub mod gemini;

#[cfg(feature = "bedrock")]
pub mod bedrock;

use crate::config::FileProviderConfig;
use imgchat_application::ports::chat_provider::{ChatProvider, ProviderError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Backend that answers questions about images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Bedrock,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Bedrock => write!(f, "bedrock"),
        }
    }
}

/// Errors raised while assembling a provider from configuration
#[derive(Error, Debug)]
pub enum ProviderSetupError {
    #[error("no API key configured: set provider.api_key or the {env} environment variable")]
    MissingApiKey { env: String },

    #[error("{0} support is not compiled in (rebuild with --features {0})")]
    NotCompiled(ProviderKind),

    #[error("failed to initialize provider: {0}")]
    Client(#[from] ProviderError),
}

/// Build the configured chat provider.
pub async fn build_chat_provider(
    config: &FileProviderConfig,
    timeout: Duration,
) -> Result<Arc<dyn ChatProvider>, ProviderSetupError> {
    match config.kind {
        ProviderKind::Gemini => {
            let api_key = config
                .resolve_api_key()
                .ok_or_else(|| ProviderSetupError::MissingApiKey {
                    env: config.api_key_env.clone(),
                })?;
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| gemini::DEFAULT_GEMINI_MODEL.to_string());

            let mut provider = gemini::GeminiChatProvider::new(api_key, model, timeout)?
                .with_max_output_tokens(Some(config.max_tokens));
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "bedrock")]
        ProviderKind::Bedrock => {
            let region = config
                .region
                .as_deref()
                .unwrap_or(bedrock::DEFAULT_BEDROCK_REGION);
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| bedrock::DEFAULT_BEDROCK_MODEL.to_string());
            let provider = bedrock::BedrockChatProvider::new(
                region,
                config.profile.as_deref(),
                model,
                config.max_tokens,
            )
            .await;
            Ok(Arc::new(provider))
        }
        #[cfg(not(feature = "bedrock"))]
        ProviderKind::Bedrock => Err(ProviderSetupError::NotCompiled(ProviderKind::Bedrock)),
    }
}
