//! Google Gemini provider
//!
//! Talks to the Generative Language REST API (`generateContent`) with the
//! image sent inline, base64-encoded.

mod provider;
mod types;

pub use provider::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiChatProvider};
