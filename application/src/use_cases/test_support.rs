//! In-memory fakes for the conversation ports, shared by use case tests.

use crate::ports::chat_provider::{ChatProvider, ChatRequest, ProviderError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::image_fetcher::{FetchError, ImageFetcher};
use crate::ports::session_store::{SessionStore, StoreError};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use imgchat_domain::{
    ConversationMessage, ConversationSession, ImageAttachment, MessageId, Role, SessionId,
    SubjectUrl, Turn, UserId,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn user(id: &str) -> UserId {
    UserId::try_new(id).unwrap()
}

// ==================== Session store ====================

#[derive(Default)]
struct StoreState {
    sessions: Vec<ConversationSession>,
    messages: Vec<ConversationMessage>,
    next_id: i64,
    tick: i64,
}

impl StoreState {
    fn next(&mut self) -> (i64, chrono::DateTime<Utc>) {
        self.next_id += 1;
        self.tick += 1;
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(self.tick);
        (self.next_id, at)
    }
}

/// Vec-backed store with a monotonic fake clock
#[derive(Default)]
pub struct InMemorySessionStore {
    state: Mutex<StoreState>,
    fail_writes: bool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose message writes always fail
    pub fn failing_writes() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            fail_writes: true,
        }
    }

    pub fn session_count(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(
        &self,
        user: &UserId,
        subject: &SubjectUrl,
    ) -> Result<ConversationSession, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .sessions
            .iter()
            .find(|s| s.user() == user && s.subject() == subject)
        {
            return Ok(existing.clone());
        }
        let (id, at) = state.next();
        let session = ConversationSession::new(SessionId(id), user.clone(), subject.clone(), at);
        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn find(
        &self,
        user: &UserId,
        subject: &SubjectUrl,
    ) -> Result<Option<ConversationSession>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .iter()
            .find(|s| s.user() == user && s.subject() == subject)
            .cloned())
    }

    async fn messages(
        &self,
        session: &ConversationSession,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.session_id == session.id())
            .cloned()
            .collect())
    }

    async fn list_non_empty(&self, user: &UserId) -> Result<Vec<ConversationSession>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut sessions: Vec<_> = state
            .sessions
            .iter()
            .filter(|s| s.user() == user)
            .filter(|s| state.messages.iter().any(|m| m.session_id == s.id()))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| std::cmp::Reverse((s.created_at(), s.id())));
        Ok(sessions)
    }

    async fn append_message(
        &self,
        session: &ConversationSession,
        role: Role,
        content: &str,
    ) -> Result<ConversationMessage, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Database("disk full".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let (id, at) = state.next();
        let message = ConversationMessage {
            id: MessageId(id),
            session_id: session.id(),
            role,
            content: content.to_string(),
            created_at: at,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn append_exchange(
        &self,
        session: &ConversationSession,
        prompt: &str,
        reply: &str,
    ) -> Result<(ConversationMessage, ConversationMessage), StoreError> {
        let user_msg = self.append_message(session, Role::User, prompt).await?;
        let model_msg = self.append_message(session, Role::Model, reply).await?;
        Ok((user_msg, model_msg))
    }

    async fn delete_messages(&self, session: &ConversationSession) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.messages.len();
        state.messages.retain(|m| m.session_id != session.id());
        Ok((before - state.messages.len()) as u64)
    }

    async fn delete_all_sessions(&self, user: &UserId) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let owned: Vec<SessionId> = state
            .sessions
            .iter()
            .filter(|s| s.user() == user)
            .map(|s| s.id())
            .collect();
        state.sessions.retain(|s| s.user() != user);
        state.messages.retain(|m| !owned.contains(&m.session_id));
        Ok(owned.len() as u64)
    }
}

// ==================== Image fetcher ====================

/// Fetcher returning a fixed result and counting calls
pub struct FakeFetcher {
    result: Result<ImageAttachment, FetchError>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn ok() -> Self {
        Self {
            result: Ok(ImageAttachment::new(vec![0xff, 0xd8, 0xff], "image/jpeg")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, _url: &SubjectUrl) -> Result<ImageAttachment, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

// ==================== Chat provider ====================

/// Provider replaying canned results and recording what it was sent
pub struct FakeProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    histories: Mutex<Vec<Vec<Turn>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            histories: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.histories.lock().unwrap().len()
    }

    pub fn history_of_call(&self, index: usize) -> Vec<Turn> {
        self.histories.lock().unwrap()[index].clone()
    }

    pub fn request_of_call(&self, index: usize) -> ChatRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(
        &self,
        history: &[Turn],
        request: &ChatRequest,
    ) -> Result<String, ProviderError> {
        self.histories.lock().unwrap().push(history.to_vec());
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Request("no more replies".to_string())))
    }
}

// ==================== Conversation logger ====================

/// Logger keeping every event in memory
#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<ConversationEvent>>,
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
