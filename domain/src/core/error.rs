//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("subject url cannot be empty")]
    EmptySubject,

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("user id cannot be empty")]
    EmptyUser,

    #[error("unknown message role: {0}")]
    UnknownRole(String),
}

impl DomainError {
    /// Whether this error was caused by missing caller input
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            DomainError::EmptySubject | DomainError::EmptyPrompt | DomainError::EmptyUser
        )
    }
}
