//! Core domain concepts shared across all subdomains.
//!
//! - [`identity::UserId`]: opaque identifier of the authenticated caller
//! - [`identity::SubjectUrl`]: the image a conversation is about
//! - [`prompt::Prompt`]: a validated question about the image
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod identity;
pub mod prompt;
