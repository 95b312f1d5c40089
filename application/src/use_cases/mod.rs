//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod ask_about_image;
pub mod error;
pub mod manage_conversations;

#[cfg(test)]
pub(crate) mod test_support;
