//! Session storage adapters.
//!
//! Provides [`SqliteSessionStore`], an embedded SQLite implementation of the
//! [`SessionStore`](imgchat_application::SessionStore) port.

mod schema;
mod sqlite;

pub use sqlite::SqliteSessionStore;
