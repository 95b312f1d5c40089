//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout exactly. Every section is
//! optional; missing keys fall back to the `Default` impls below.

use crate::providers::ProviderKind;
use imgchat_application::ConversationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default image size cap for the fetcher (10 MiB)
pub const DEFAULT_FETCH_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    ZeroTimeout { field: &'static str },

    #[error("provider.model cannot be empty")]
    EmptyModelName,

    #[error("fetch.max_bytes cannot be 0")]
    ZeroMaxBytes,

    #[error("provider.max_tokens cannot be 0")]
    ZeroMaxTokens,
}

/// `[provider]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Which backend answers questions
    pub kind: ProviderKind,
    /// Model override; each provider has its own default
    pub model: Option<String>,
    /// Direct API key (prefer the environment variable)
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// API root override (Gemini)
    pub base_url: Option<String>,
    /// AWS region (Bedrock)
    pub region: Option<String>,
    /// AWS profile (Bedrock)
    pub profile: Option<String>,
    /// Response length cap
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: None,
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            region: None,
            profile: None,
            max_tokens: 8192,
        }
    }
}

impl FileProviderConfig {
    /// The configured key, falling back to the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// `[storage]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// SQLite database file; defaults under the platform data directory
    pub database: Option<PathBuf>,
}

impl FileStorageConfig {
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("imgchat").join("conversations.db")))
    }
}

/// `[fetch]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFetchConfig {
    pub timeout_seconds: u64,
    pub max_bytes: usize,
}

impl Default for FileFetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_bytes: DEFAULT_FETCH_MAX_BYTES,
        }
    }
}

/// `[behavior]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Upper bound on one provider call
    pub provider_timeout_seconds: u64,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            provider_timeout_seconds: 120,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of ask outcomes
    pub conversation_log: Option<PathBuf>,
    /// Directory for the daily-rotated diagnostic log
    pub directory: Option<PathBuf>,
}

/// `[identity]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIdentityConfig {
    pub user: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub provider: FileProviderConfig,
    pub storage: FileStorageConfig,
    pub fetch: FileFetchConfig,
    pub behavior: FileBehaviorConfig,
    pub logging: FileLoggingConfig,
    pub identity: FileIdentityConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.fetch.timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout {
                field: "fetch.timeout_seconds",
            });
        }
        if self.behavior.provider_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout {
                field: "behavior.provider_timeout_seconds",
            });
        }
        if self.fetch.max_bytes == 0 {
            return Err(ConfigValidationError::ZeroMaxBytes);
        }
        if self.provider.max_tokens == 0 {
            return Err(ConfigValidationError::ZeroMaxTokens);
        }
        if let Some(model) = &self.provider.model
            && model.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyModelName);
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_seconds)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.behavior.provider_timeout_seconds)
    }

    /// Use-case settings derived from this file
    pub fn to_conversation_config(&self) -> ConversationConfig {
        ConversationConfig::from_timeout_seconds(
            self.fetch.timeout_seconds,
            self.behavior.provider_timeout_seconds,
        )
    }
}
