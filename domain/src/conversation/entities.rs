//! Conversation domain entities

use crate::core::error::DomainError;
use crate::core::identity::{SubjectUrl, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned sequence id of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Author of a persisted message.
///
/// Closed set: anything else read back from storage is rejected with
/// [`DomainError::UnknownRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// A conversation scope binding one user to one subject (Entity)
///
/// Identity is the `(user, subject)` pair; the store guarantees at most one
/// session per pair. `id` is the surrogate key assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    id: SessionId,
    user: UserId,
    subject: SubjectUrl,
    created_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(id: SessionId, user: UserId, subject: SubjectUrl, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user,
            subject,
            created_at,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn subject(&self) -> &SubjectUrl {
        &self.subject
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A single persisted message (Entity)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub session_id: SessionId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A session together with its full ordered message list
#[derive(Debug, Clone)]
pub struct ConversationDetail {
    pub session: ConversationSession,
    pub messages: Vec<ConversationMessage>,
}

impl ConversationDetail {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("model".parse::<Role>().unwrap(), Role::Model);
        assert_eq!(Role::Model.as_str(), "model");
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "assistant".parse::<Role>().unwrap_err();
        assert_eq!(err, DomainError::UnknownRole("assistant".to_string()));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
