//! Consumer-facing conversation boundary.
//!
//! Mirrors the original endpoint: one resource with ask, get and clear
//! branches. Every call yields an [`Outcome`] carrying an HTTP-equivalent
//! status and an optional body; typed errors never escape.

use crate::api::{
    AskRequest, AskResponse, ErrorResponse, ResponseBody, SessionDetailView, SessionSummaryView,
};
use imgchat_application::{
    AskAboutImageUseCase, AskInput, ConversationError, ErrorCategory, ManageConversationsUseCase,
};
use imgchat_domain::UserId;
use tracing::{debug, warn};

/// Coarse outcome status with an HTTP-equivalent code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Created,
    Ok,
    NoContent,
    BadRequest,
    NotFound,
    TooManyRequests,
    BadGateway,
    InternalError,
}

impl StatusCategory {
    pub fn http_status(&self) -> u16 {
        match self {
            StatusCategory::Created => 201,
            StatusCategory::Ok => 200,
            StatusCategory::NoContent => 204,
            StatusCategory::BadRequest => 400,
            StatusCategory::NotFound => 404,
            StatusCategory::TooManyRequests => 429,
            StatusCategory::BadGateway => 502,
            StatusCategory::InternalError => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        self.http_status() < 300
    }
}

impl From<ErrorCategory> for StatusCategory {
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Validation => StatusCategory::BadRequest,
            ErrorCategory::NotFound => StatusCategory::NotFound,
            ErrorCategory::RateLimited => StatusCategory::TooManyRequests,
            ErrorCategory::Upstream => StatusCategory::BadGateway,
            ErrorCategory::Internal => StatusCategory::InternalError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: StatusCategory,
    pub body: Option<ResponseBody>,
}

impl Outcome {
    fn success(status: StatusCategory, body: ResponseBody) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: StatusCategory::NoContent,
            body: None,
        }
    }

    fn failure(err: &ConversationError) -> Self {
        let status = StatusCategory::from(err.category());
        if status == StatusCategory::InternalError {
            warn!(error = %err, "Conversation request failed internally");
        } else {
            debug!(error = %err, status = status.http_status(), "Conversation request rejected");
        }
        Self {
            status,
            body: Some(ResponseBody::Error(ErrorResponse::from(err))),
        }
    }
}

/// A blank subject is the same as no subject.
fn normalize_subject(subject_url: Option<&str>) -> Option<&str> {
    subject_url.map(str::trim).filter(|s| !s.is_empty())
}

/// Routes boundary requests to the conversation use cases
pub struct ConversationController {
    ask: Option<AskAboutImageUseCase>,
    manage: ManageConversationsUseCase,
}

impl ConversationController {
    pub fn new(ask: AskAboutImageUseCase, manage: ManageConversationsUseCase) -> Self {
        Self {
            ask: Some(ask),
            manage,
        }
    }

    /// A controller for the get and clear branches only.
    ///
    /// Used when no chat provider is assembled; `ask` then fails internally.
    pub fn read_only(manage: ManageConversationsUseCase) -> Self {
        Self { ask: None, manage }
    }

    /// Ask a question about an image; 201 with the reply on success.
    pub async fn ask(&self, user: &UserId, request: AskRequest) -> Outcome {
        let Some(ask) = &self.ask else {
            return Outcome::failure(&ConversationError::InternalFailure(
                "no chat provider configured".to_string(),
            ));
        };
        let input = AskInput::new(user.clone(), request.subject_url, request.prompt);
        match ask.execute(input).await {
            Ok(reply_text) => Outcome::success(
                StatusCategory::Created,
                ResponseBody::Reply(AskResponse { reply_text }),
            ),
            Err(e) => Outcome::failure(&e),
        }
    }

    /// One conversation when a subject is given, otherwise all active ones.
    pub async fn get_conversation(&self, user: &UserId, subject_url: Option<&str>) -> Outcome {
        let result = match normalize_subject(subject_url) {
            Some(subject) => self
                .manage
                .get_detail(user, subject)
                .await
                .map(|detail| ResponseBody::Detail(SessionDetailView::from(&detail))),
            None => self.manage.list_summaries(user).await.map(|sessions| {
                ResponseBody::Summaries(sessions.iter().map(SessionSummaryView::from).collect())
            }),
        };

        match result {
            Ok(body) => Outcome::success(StatusCategory::Ok, body),
            Err(e) => Outcome::failure(&e),
        }
    }

    /// Clear one conversation's messages, or delete every session.
    pub async fn clear_conversation(&self, user: &UserId, subject_url: Option<&str>) -> Outcome {
        let result = match normalize_subject(subject_url) {
            Some(subject) => self.manage.clear(user, subject).await,
            None => self.manage.clear_all(user).await,
        };

        match result {
            Ok(_) => Outcome::no_content(),
            Err(e) => Outcome::failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use imgchat_application::{ChatProvider, ChatRequest, FetchError, ImageFetcher, ProviderError};
    use imgchat_domain::{ImageAttachment, SubjectUrl, Turn};
    use imgchat_infrastructure::SqliteSessionStore;
    use std::sync::{Arc, Mutex};

    const CAT: &str = "https://img.example/cat.png";

    struct StaticFetcher(Result<ImageAttachment, FetchError>);

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &SubjectUrl) -> Result<ImageAttachment, FetchError> {
            self.0.clone()
        }
    }

    struct ScriptedProvider(Mutex<Vec<Result<String, ProviderError>>>);

    impl ScriptedProvider {
        fn new(mut replies: Vec<Result<String, ProviderError>>) -> Self {
            replies.reverse();
            Self(Mutex::new(replies))
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _history: &[Turn],
            _request: &ChatRequest,
        ) -> Result<String, ProviderError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ProviderError::EmptyReply))
        }
    }

    async fn controller_with(
        fetched: Result<ImageAttachment, FetchError>,
        replies: Vec<Result<String, ProviderError>>,
    ) -> ConversationController {
        let store = Arc::new(SqliteSessionStore::open_in_memory().await.unwrap());
        let ask = AskAboutImageUseCase::new(
            store.clone(),
            Arc::new(StaticFetcher(fetched)),
            Arc::new(ScriptedProvider::new(replies)),
        );
        ConversationController::new(ask, ManageConversationsUseCase::new(store))
    }

    async fn controller(replies: &[&str]) -> ConversationController {
        controller_with(
            Ok(ImageAttachment::new(vec![1, 2, 3], "image/png")),
            replies.iter().map(|r| Ok(r.to_string())).collect(),
        )
        .await
    }

    fn alice() -> UserId {
        UserId::try_new("alice").unwrap()
    }

    fn ask_request(prompt: &str) -> AskRequest {
        AskRequest {
            subject_url: CAT.to_string(),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ask_returns_created_with_reply() {
        let controller = controller(&["A tabby cat."]).await;

        let outcome = controller.ask(&alice(), ask_request("What is it?")).await;

        assert_eq!(outcome.status.http_status(), 201);
        assert_eq!(
            outcome.body,
            Some(ResponseBody::Reply(AskResponse {
                reply_text: "A tabby cat.".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn test_ask_with_empty_prompt_is_bad_request() {
        let controller = controller(&[]).await;

        let outcome = controller.ask(&alice(), ask_request("")).await;

        assert_eq!(outcome.status, StatusCategory::BadRequest);
        assert!(matches!(outcome.body, Some(ResponseBody::Error(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_429() {
        let controller = controller_with(
            Ok(ImageAttachment::new(vec![1], "image/png")),
            vec![Err(ProviderError::RateLimited("quota".to_string()))],
        )
        .await;

        let outcome = controller.ask(&alice(), ask_request("Hi")).await;

        assert_eq!(outcome.status.http_status(), 429);
    }

    #[tokio::test]
    async fn test_fetch_failure_maps_to_502() {
        let controller = controller_with(Err(FetchError::Status(404)), vec![]).await;

        let outcome = controller.ask(&alice(), ask_request("Hi")).await;

        assert_eq!(outcome.status, StatusCategory::BadGateway);
    }

    #[tokio::test]
    async fn test_get_with_subject_returns_detail() {
        let controller = controller(&["A tabby cat."]).await;
        controller.ask(&alice(), ask_request("What is it?")).await;

        let outcome = controller.get_conversation(&alice(), Some(CAT)).await;

        assert_eq!(outcome.status, StatusCategory::Ok);
        match outcome.body {
            Some(ResponseBody::Detail(view)) => {
                assert_eq!(view.subject_url, CAT);
                assert_eq!(view.messages.len(), 2);
                assert_eq!(view.messages[0].content, "What is it?");
                assert_eq!(view.messages[1].content, "A tabby cat.");
            }
            other => panic!("Expected detail, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_without_subject_lists_active_sessions() {
        let controller = controller(&["A tabby cat."]).await;
        controller.ask(&alice(), ask_request("What is it?")).await;
        // viewing creates an empty session that must not be listed
        controller
            .get_conversation(&alice(), Some("https://img.example/other.png"))
            .await;

        let outcome = controller.get_conversation(&alice(), Some("  ")).await;

        match outcome.body {
            Some(ResponseBody::Summaries(list)) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].subject_url, CAT);
            }
            other => panic!("Expected summaries, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clear_unknown_subject_is_not_found() {
        let controller = controller(&[]).await;

        let outcome = controller.clear_conversation(&alice(), Some(CAT)).await;

        assert_eq!(outcome.status.http_status(), 404);
    }

    #[tokio::test]
    async fn test_clear_existing_subject_is_no_content() {
        let controller = controller(&["A tabby cat."]).await;
        controller.ask(&alice(), ask_request("What is it?")).await;

        let outcome = controller.clear_conversation(&alice(), Some(CAT)).await;

        assert_eq!(outcome.status, StatusCategory::NoContent);
        assert!(outcome.body.is_none());
    }

    #[tokio::test]
    async fn test_read_only_controller_rejects_ask() {
        let store = Arc::new(SqliteSessionStore::open_in_memory().await.unwrap());
        let controller = ConversationController::read_only(ManageConversationsUseCase::new(store));

        let outcome = controller.ask(&alice(), ask_request("Hi")).await;
        assert_eq!(outcome.status, StatusCategory::InternalError);

        let listed = controller.get_conversation(&alice(), None).await;
        assert_eq!(listed.status, StatusCategory::Ok);
    }

    #[tokio::test]
    async fn test_clear_all_with_no_sessions_succeeds() {
        let controller = controller(&[]).await;

        let outcome = controller.clear_conversation(&alice(), None).await;

        assert_eq!(outcome.status.http_status(), 204);
    }
}
