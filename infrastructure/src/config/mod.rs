//! Configuration file loading for imgchat
//!
//! Merges built-in defaults, the global and project config files, an
//! explicit `--config` file and `IMGCHAT_*` environment variables.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_FETCH_MAX_BYTES, FileBehaviorConfig, FileConfig,
    FileFetchConfig, FileIdentityConfig, FileLoggingConfig, FileProviderConfig,
    FileStorageConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
