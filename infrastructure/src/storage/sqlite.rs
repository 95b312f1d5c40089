//! SQLite-backed session store.
//!
//! A single connection behind `Arc<Mutex<_>>`; every query runs on the
//! blocking pool via `spawn_blocking`. The lock is held per statement (or per
//! transaction), never across an await, so concurrent asks interleave at the
//! statement level.

use super::schema;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use imgchat_application::ports::session_store::{SessionStore, StoreError};
use imgchat_domain::{
    ConversationMessage, ConversationSession, MessageId, Role, SessionId, SubjectUrl, UserId,
};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Embedded SQLite implementation of [`SessionStore`]
#[derive(Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteSessionStore {
    /// Open (or create) a database file, creating parent directories as needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let open_path = db_path.clone();
        let conn = tokio::task::spawn_blocking(move || -> rusqlite::Result<Connection> {
            let conn = Connection::open(&open_path)?;
            schema::apply(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
        .map_err(map_sql_error)?;

        debug!(path = %db_path.display(), "Opened session database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(db_path),
        })
    }

    /// Open a private in-memory database
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = tokio::task::spawn_blocking(|| -> rusqlite::Result<Connection> {
            let conn = Connection::open_in_memory()?;
            schema::apply(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
        .map_err(map_sql_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn run_blocking<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::TaskFailed("database lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

fn now_timestamp() -> String {
    // Fixed-width UTC timestamps sort lexicographically in creation order.
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_sql_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(_, _, cause) => {
            StoreError::Corrupt(cause.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_role(row: &Row<'_>, idx: usize) -> rusqlite::Result<Role> {
    let raw: String = row.get(idx)?;
    raw.parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_subject(row: &Row<'_>, idx: usize) -> rusqlite::Result<SubjectUrl> {
    let raw: String = row.get(idx)?;
    SubjectUrl::try_new(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn insert_message(
    conn: &Connection,
    session: SessionId,
    user: &str,
    role: Role,
    content: &str,
) -> Result<ConversationMessage, StoreError> {
    let created_at = now_timestamp();
    // Scoped to the owner so a stale handle cannot write into someone else's session.
    let inserted = conn
        .execute(
            "INSERT INTO chat_messages (session_id, role, content, created_at)
             SELECT ?1, ?2, ?3, ?4
             WHERE EXISTS (SELECT 1 FROM chat_sessions WHERE id = ?1 AND user_id = ?5)",
            params![session.0, role.as_str(), content, created_at, user],
        )
        .map_err(map_sql_error)?;

    if inserted == 0 {
        return Err(StoreError::MissingSession(session.0));
    }

    let id = conn.last_insert_rowid();
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(ConversationMessage {
        id: MessageId(id),
        session_id: session,
        role,
        content: content.to_string(),
        created_at,
    })
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get_or_create(
        &self,
        user: &UserId,
        subject: &SubjectUrl,
    ) -> Result<ConversationSession, StoreError> {
        let user = user.clone();
        let subject = subject.clone();
        self.run_blocking(move |conn| {
            conn.execute(
                "INSERT INTO chat_sessions (user_id, subject_url, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, subject_url) DO NOTHING",
                params![user.as_str(), subject.as_str(), now_timestamp()],
            )
            .map_err(map_sql_error)?;

            let (id, created_at) = conn
                .query_row(
                    "SELECT id, created_at FROM chat_sessions
                     WHERE user_id = ?1 AND subject_url = ?2",
                    params![user.as_str(), subject.as_str()],
                    |row| Ok((row.get::<_, i64>(0)?, parse_timestamp(row, 1)?)),
                )
                .map_err(map_sql_error)?;

            Ok(ConversationSession::new(
                SessionId(id),
                user,
                subject,
                created_at,
            ))
        })
        .await
    }

    async fn find(
        &self,
        user: &UserId,
        subject: &SubjectUrl,
    ) -> Result<Option<ConversationSession>, StoreError> {
        let user = user.clone();
        let subject = subject.clone();
        self.run_blocking(move |conn| {
            let found = conn
                .query_row(
                    "SELECT id, created_at FROM chat_sessions
                     WHERE user_id = ?1 AND subject_url = ?2",
                    params![user.as_str(), subject.as_str()],
                    |row| Ok((row.get::<_, i64>(0)?, parse_timestamp(row, 1)?)),
                )
                .optional()
                .map_err(map_sql_error)?;

            Ok(found.map(|(id, created_at)| {
                ConversationSession::new(SessionId(id), user, subject, created_at)
            }))
        })
        .await
    }

    async fn messages(
        &self,
        session: &ConversationSession,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        let session_id = session.id();
        let user = session.user().as_str().to_string();
        self.run_blocking(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT m.id, m.role, m.content, m.created_at
                     FROM chat_messages m
                     JOIN chat_sessions s ON s.id = m.session_id
                     WHERE m.session_id = ?1 AND s.user_id = ?2
                     ORDER BY m.created_at ASC, m.id ASC",
                )
                .map_err(map_sql_error)?;

            let rows = stmt
                .query_map(params![session_id.0, user], |row| {
                    Ok(ConversationMessage {
                        id: MessageId(row.get(0)?),
                        session_id,
                        role: parse_role(row, 1)?,
                        content: row.get(2)?,
                        created_at: parse_timestamp(row, 3)?,
                    })
                })
                .map_err(map_sql_error)?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)
        })
        .await
    }

    async fn list_non_empty(&self, user: &UserId) -> Result<Vec<ConversationSession>, StoreError> {
        let user = user.clone();
        self.run_blocking(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT s.id, s.subject_url, s.created_at
                     FROM chat_sessions s
                     WHERE s.user_id = ?1
                       AND EXISTS (SELECT 1 FROM chat_messages m WHERE m.session_id = s.id)
                     ORDER BY s.created_at DESC, s.id DESC",
                )
                .map_err(map_sql_error)?;

            let rows = stmt
                .query_map(params![user.as_str()], |row| {
                    Ok(ConversationSession::new(
                        SessionId(row.get(0)?),
                        user.clone(),
                        parse_subject(row, 1)?,
                        parse_timestamp(row, 2)?,
                    ))
                })
                .map_err(map_sql_error)?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)
        })
        .await
    }

    async fn append_message(
        &self,
        session: &ConversationSession,
        role: Role,
        content: &str,
    ) -> Result<ConversationMessage, StoreError> {
        let session_id = session.id();
        let user = session.user().as_str().to_string();
        let content = content.to_string();
        self.run_blocking(move |conn| insert_message(conn, session_id, &user, role, &content))
            .await
    }

    async fn append_exchange(
        &self,
        session: &ConversationSession,
        prompt: &str,
        reply: &str,
    ) -> Result<(ConversationMessage, ConversationMessage), StoreError> {
        let session_id = session.id();
        let user = session.user().as_str().to_string();
        let prompt = prompt.to_string();
        let reply = reply.to_string();
        self.run_blocking(move |conn| {
            let tx = conn.transaction().map_err(map_sql_error)?;
            let user_msg = insert_message(&tx, session_id, &user, Role::User, &prompt)?;
            let model_msg = insert_message(&tx, session_id, &user, Role::Model, &reply)?;
            tx.commit().map_err(map_sql_error)?;
            Ok((user_msg, model_msg))
        })
        .await
    }

    async fn delete_messages(&self, session: &ConversationSession) -> Result<u64, StoreError> {
        let session_id = session.id();
        let user = session.user().as_str().to_string();
        self.run_blocking(move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM chat_messages
                     WHERE session_id = ?1
                       AND session_id IN (SELECT id FROM chat_sessions WHERE user_id = ?2)",
                    params![session_id.0, user],
                )
                .map_err(map_sql_error)?;
            Ok(removed as u64)
        })
        .await
    }

    async fn delete_all_sessions(&self, user: &UserId) -> Result<u64, StoreError> {
        let user = user.as_str().to_string();
        self.run_blocking(move |conn| {
            // Messages go with their sessions through ON DELETE CASCADE.
            let removed = conn
                .execute("DELETE FROM chat_sessions WHERE user_id = ?1", params![user])
                .map_err(map_sql_error)?;
            Ok(removed as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOG: &str = "https://images.dog.ceo/breeds/corgi/corgi-1.jpg";
    const PUG: &str = "https://images.dog.ceo/breeds/pug/pug-7.jpg";

    fn user(id: &str) -> UserId {
        UserId::try_new(id).unwrap()
    }

    fn subject(url: &str) -> SubjectUrl {
        SubjectUrl::try_new(url).unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();

        let first = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        let second = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(first.created_at(), second.created_at());
    }

    #[tokio::test]
    async fn test_same_subject_different_users_get_different_sessions() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();

        let alice = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        let bob = store.get_or_create(&user("bob"), &subject(DOG)).await.unwrap();

        assert_ne!(alice.id(), bob.id());
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_does_not_duplicate() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_find_does_not_create() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();

        assert!(store.find(&user("alice"), &subject(DOG)).await.unwrap().is_none());
        assert!(store.list_non_empty(&user("alice")).await.unwrap().is_empty());

        store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        assert!(store.find(&user("alice"), &subject(DOG)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_append_exchange_orders_user_then_model() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let session = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();

        store
            .append_exchange(&session, "What breed?", "A corgi.")
            .await
            .unwrap();
        store
            .append_exchange(&session, "Is it a puppy?", "Probably not.")
            .await
            .unwrap();

        let messages = store.messages(&session).await.unwrap();
        let transcript: Vec<_> = messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            transcript,
            vec![
                (Role::User, "What breed?"),
                (Role::Model, "A corgi."),
                (Role::User, "Is it a puppy?"),
                (Role::Model, "Probably not."),
            ]
        );
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_list_non_empty_skips_empty_and_orders_newest_first() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let dog = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        let pug = store.get_or_create(&user("alice"), &subject(PUG)).await.unwrap();
        store
            .get_or_create(&user("alice"), &subject("https://example.com/empty.png"))
            .await
            .unwrap();

        store.append_message(&dog, Role::User, "hi").await.unwrap();
        store.append_message(&pug, Role::User, "hi").await.unwrap();

        let listed = store.list_non_empty(&user("alice")).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![pug.id(), dog.id()]);
    }

    #[tokio::test]
    async fn test_delete_messages_keeps_session() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let session = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        store.append_exchange(&session, "q", "a").await.unwrap();

        assert_eq!(store.delete_messages(&session).await.unwrap(), 2);

        let again = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        assert_eq!(again.id(), session.id());
        assert!(store.messages(&again).await.unwrap().is_empty());
        assert!(store.list_non_empty(&user("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_cascades_and_is_scoped() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let alice = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        let bob = store.get_or_create(&user("bob"), &subject(DOG)).await.unwrap();
        store.append_exchange(&alice, "q", "a").await.unwrap();
        store.append_exchange(&bob, "q", "a").await.unwrap();

        assert_eq!(store.delete_all_sessions(&user("alice")).await.unwrap(), 1);
        assert_eq!(store.delete_all_sessions(&user("alice")).await.unwrap(), 0);

        assert!(store.find(&user("alice"), &subject(DOG)).await.unwrap().is_none());
        assert_eq!(store.messages(&bob).await.unwrap().len(), 2);

        let orphaned: i64 = {
            let conn = store.conn.lock().unwrap();
            conn.query_row("SELECT COUNT(*) FROM chat_messages", [], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(orphaned, 2);
    }

    #[tokio::test]
    async fn test_append_to_deleted_session_fails() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let session = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        store.delete_all_sessions(&user("alice")).await.unwrap();

        let err = store
            .append_exchange(&session, "q", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingSession(_)));
    }

    #[tokio::test]
    async fn test_foreign_session_handle_cannot_read_or_write() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let alice = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        store.append_exchange(&alice, "secret", "reply").await.unwrap();

        let forged = ConversationSession::new(
            alice.id(),
            user("mallory"),
            subject(DOG),
            alice.created_at(),
        );

        assert!(store.messages(&forged).await.unwrap().is_empty());
        assert_eq!(store.delete_messages(&forged).await.unwrap(), 0);
        assert!(store.append_message(&forged, Role::User, "x").await.is_err());
        assert_eq!(store.messages(&alice).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_role_is_reported_as_corrupt() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        let session = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO chat_messages (session_id, role, content, created_at)
                 VALUES (1, 'system', 'x', '2024-01-01T00:00:00.000000Z');",
            )
            .unwrap();
        }

        let err = store.messages(&session).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("conversations.db");

        {
            let store = SqliteSessionStore::open(&path).await.unwrap();
            let session = store.get_or_create(&user("alice"), &subject(DOG)).await.unwrap();
            store.append_exchange(&session, "q", "a").await.unwrap();
        }

        let store = SqliteSessionStore::open(&path).await.unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        let listed = store.list_non_empty(&user("alice")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(store.messages(&listed[0]).await.unwrap().len(), 2);
    }
}
