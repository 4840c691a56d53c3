pub mod assistants;
pub mod clients;
pub mod config;
pub mod feedback;
pub mod models;
pub mod service;

pub use assistants::{Assistant, AssistantError, AssistantReply, answer_question, build_assistant};
pub use config::{AssistantMode, ServiceConfig};
pub use feedback::{FeedbackStore, UsageStats};
pub use models::*;
pub use service::{AppState, build_router, create_app};
