//! AWS Bedrock Converse API provider
//!
//! Provides access to vision-capable models via AWS IAM authentication.

mod provider;
mod types;

pub use provider::{BedrockChatProvider, DEFAULT_BEDROCK_MODEL, DEFAULT_BEDROCK_REGION};
