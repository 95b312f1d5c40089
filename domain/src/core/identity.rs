//! Identity value objects: who is asking, and about what.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an already-authenticated user (Value Object).
///
/// The identity provider is trusted unconditionally; the only check made
/// here is that the identifier is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyUser);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the subject resource a conversation is bound to (Value Object).
///
/// In practice this is the URL of an image. Surrounding whitespace is trimmed
/// so that `" https://x/a.jpg"` and `"https://x/a.jpg"` resolve to the same
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectUrl(String);

impl SubjectUrl {
    pub fn try_new(url: impl Into<String>) -> Result<Self, DomainError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptySubject);
        }
        if trimmed.len() == url.len() {
            Ok(Self(url))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
