//! History projection.
//!
//! Converts the persisted message history of a session into the ordered turn
//! sequence a chat provider expects. Pure: no I/O, same input gives the same
//! output.

use super::entities::{ConversationMessage, Role};
use super::turn::{Part, Turn, TurnRole};

/// Map a stored role onto the provider turn role
pub fn turn_role(role: Role) -> TurnRole {
    match role {
        Role::User => TurnRole::User,
        Role::Model => TurnRole::Model,
    }
}

/// Project stored messages into provider turns.
///
/// Yields exactly one turn per message, in the given order, each carrying the
/// message content as its only part. Callers pass messages already ordered by
/// creation time.
pub fn project_history(messages: &[ConversationMessage]) -> Vec<Turn> {
    messages
        .iter()
        .map(|msg| Turn {
            role: turn_role(msg.role),
            parts: vec![Part::Text(msg.content.clone())],
        })
        .collect()
}
