//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_provider;
pub mod conversation_logger;
pub mod image_fetcher;
pub mod session_store;
