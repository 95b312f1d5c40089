//! Gemini chat provider implementation

use super::types::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ListModelsResponse, to_content,
};
use async_trait::async_trait;
use imgchat_application::ports::chat_provider::{ChatProvider, ChatRequest, ProviderError};
use imgchat_domain::Turn;
use imgchat_domain::util::preview;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Longest error body kept from a failed response
const MAX_ERROR_BODY: usize = 1024;
const MAX_MODEL_PAGES: usize = 20;

/// Gemini `generateContent` client implementing [`ChatProvider`]
#[derive(Clone)]
pub struct GeminiChatProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_output_tokens: Option<u32>,
}

impl fmt::Debug for GeminiChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiChatProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiChatProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_output_tokens: None,
        })
    }

    /// Point the provider at a different API root (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, history: &[Turn], request: &ChatRequest) -> GenerateContentRequest {
        let mut contents: Vec<_> = history.iter().map(to_content).collect();
        contents.push(to_content(&request.to_turn()));

        GenerateContentRequest {
            contents,
            generation_config: self.max_output_tokens.map(|max| GenerationConfig {
                max_output_tokens: Some(max),
            }),
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Connection(err.to_string())
    }
}

/// Classify a non-success response.
///
/// Quota exhaustion shows up either as HTTP 429 or as an error envelope with
/// status `RESOURCE_EXHAUSTED`.
fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| preview(body, MAX_ERROR_BODY));

    let exhausted = envelope
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED")
        || envelope
            .as_ref()
            .and_then(|e| e.error.code)
            .is_some_and(|c| c == 429);

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        ProviderError::RateLimited(message)
    } else {
        ProviderError::Request(format!("Gemini API error {}: {}", status.as_u16(), message))
    }
}

#[async_trait]
impl ChatProvider for GeminiChatProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        history: &[Turn],
        request: &ChatRequest,
    ) -> Result<String, ProviderError> {
        let url = self.generate_url();
        let body = self.build_request(history, request);

        debug!(
            model = %self.model,
            turns = body.contents.len(),
            image_bytes = request.image.len(),
            "Calling Gemini generateContent"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        info!(model = %self.model, status = status.as_u16(), "Gemini responded");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(format!("Malformed Gemini response: {}", e)))?;

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(match parsed.blocked_reason() {
                Some(reason) => ProviderError::Request(format!("Gemini blocked the reply: {}", reason)),
                None => ProviderError::EmptyReply,
            });
        }

        Ok(text)
    }

    /// Every model that supports `generateContent`, following `nextPageToken`
    /// across pages.
    async fn available_models(&self) -> Result<Vec<String>, ProviderError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut request = self
                .client
                .get(format!("{}/v1beta/models", self.base_url))
                .header("x-goog-api-key", &self.api_key);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(map_transport_error)?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(classify_error(status, &text));
            }

            let listing: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::Request(format!("Malformed model list: {}", e)))?;

            models.extend(
                listing
                    .models
                    .into_iter()
                    .filter(|m| {
                        m.supported_generation_methods
                            .iter()
                            .any(|method| method == "generateContent")
                    })
                    .map(|m| m.name.trim_start_matches("models/").to_string()),
            );

            match listing.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(models),
            }
        }

        debug!(pages = MAX_MODEL_PAGES, "Model listing truncated");
        Ok(models)
    }
}
