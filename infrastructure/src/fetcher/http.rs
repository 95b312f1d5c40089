//! HTTP image fetcher backed by `reqwest`.

use async_trait::async_trait;
use imgchat_application::ports::image_fetcher::{FetchError, ImageFetcher};
use imgchat_domain::{ImageAttachment, SubjectUrl};
use std::time::Duration;
use tracing::debug;

/// Largest image accepted by default (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const USER_AGENT: &str = concat!("imgchat/", env!("CARGO_PKG_VERSION"));

/// Downloads subject images over HTTP(S)
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client, max_bytes })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }

    /// Read the body chunk by chunk, giving up as soon as it passes
    /// `max_bytes`. Chunked responses carry no Content-Length up front.
    async fn read_capped(&self, mut response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_transport_error)? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn map_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_builder() {
        FetchError::InvalidUrl(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &SubjectUrl) -> Result<ImageAttachment, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = self.read_capped(response).await?;

        let image = ImageAttachment::from_content_type(body, content_type.as_deref());
        debug!(url = %url, bytes = image.len(), mime = %image.mime_type, "Downloaded image");
        Ok(image)
    }
}
