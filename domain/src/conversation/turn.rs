//! Provider-facing conversation turns.
//!
//! These types describe content in the shape a multimodal chat provider
//! consumes. They carry no storage identity; adapters translate them into
//! their own wire format.

use serde::{Deserialize, Serialize};

/// Default MIME type assumed for fetched images with no usable content type.
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Normalized role of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One content part of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    InlineImage { mime_type: String, data: Vec<u8> },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            Part::InlineImage { .. } => None,
        }
    }
}

/// A role-tagged unit of conversation content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![Part::text(text)],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all text parts
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Binary image content fetched for a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Build an attachment, falling back to [`DEFAULT_IMAGE_MIME_TYPE`] unless
    /// the given content type names an `image/*` type.
    pub fn from_content_type(bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        let mime_type = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/") && ct.len() > "image/".len())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string());
        Self { bytes, mime_type }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The attachment as a provider content part
    pub fn to_part(&self) -> Part {
        Part::InlineImage {
            mime_type: self.mime_type.clone(),
            data: self.bytes.clone(),
        }
    }
}
