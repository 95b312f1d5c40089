//! Image Fetcher port
//!
//! Retrieves the binary content of a subject image. Nothing is cached: every
//! ask fetches again.

use async_trait::async_trait;
use imgchat_domain::{ImageAttachment, SubjectUrl};
use thiserror::Error;

/// Transport-level failures while fetching an image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("image request returned HTTP {0}")]
    Status(u16),

    #[error("image transport error: {0}")]
    Transport(String),

    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("invalid image url: {0}")]
    InvalidUrl(String),

    #[error("image fetch timed out")]
    Timeout,
}

/// Fetches image bytes for a subject URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &SubjectUrl) -> Result<ImageAttachment, FetchError>;
}
