//! Request and response shapes of the conversation boundary

pub mod dto;

pub use dto::{
    AskRequest, AskResponse, ErrorResponse, MessageView, ResponseBody, SessionDetailView,
    SessionSummaryView,
};
