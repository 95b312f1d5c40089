//! Infrastructure layer for imgchat
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: SQLite session storage, the HTTP image fetcher, chat
//! providers, the JSONL transcript and configuration file loading.

pub mod config;
pub mod fetcher;
pub mod logging;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileProviderConfig};
pub use fetcher::{DEFAULT_MAX_IMAGE_BYTES, HttpImageFetcher};
pub use logging::JsonlConversationLogger;
pub use providers::{
    ProviderKind, ProviderSetupError, build_chat_provider,
    gemini::{DEFAULT_GEMINI_MODEL, GeminiChatProvider},
};
pub use storage::SqliteSessionStore;
