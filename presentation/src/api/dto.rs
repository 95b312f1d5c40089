//! Serializable request/response DTOs.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use imgchat_application::{ConversationError, ErrorCategory};
use imgchat_domain::{ConversationDetail, ConversationMessage, ConversationSession, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub subject_url: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub reply_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: String,
    pub category: ErrorCategory,
}

impl From<&ConversationError> for ErrorResponse {
    fn from(err: &ConversationError) -> Self {
        Self {
            error_message: err.user_message(),
            category: err.category(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversationMessage> for MessageView {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            id: message.id.0,
            role: message.role,
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailView {
    pub id: i64,
    pub subject_url: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageView>,
}

impl From<&ConversationDetail> for SessionDetailView {
    fn from(detail: &ConversationDetail) -> Self {
        Self {
            id: detail.session.id().0,
            subject_url: detail.session.subject().to_string(),
            created_at: detail.session.created_at(),
            messages: detail.messages.iter().map(MessageView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryView {
    pub id: i64,
    pub subject_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversationSession> for SessionSummaryView {
    fn from(session: &ConversationSession) -> Self {
        Self {
            id: session.id().0,
            subject_url: session.subject().to_string(),
            created_at: session.created_at(),
        }
    }
}

/// Body of a controller outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Reply(AskResponse),
    Detail(SessionDetailView),
    Summaries(Vec<SessionSummaryView>),
    Error(ErrorResponse),
}
