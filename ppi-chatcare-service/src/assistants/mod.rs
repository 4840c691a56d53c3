pub mod literature;
pub mod reference;
pub mod utils;

pub use literature::LiteratureAssistant;
pub use reference::ReferenceAssistant;

use async_trait::async_trait;
use ppi_guidance::Citation;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{AssistantMode, ServiceConfig};

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Assistant is not configured: {0}")]
    MissingConfig(String),

    #[error("Language model request failed: {0}")]
    Llm(String),

    #[error("Literature search failed: {0}")]
    Literature(String),
}

/// An answer and the references parsed out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub references: Vec<Citation>,
}

/// Something that can answer a free-text PPI question.
#[async_trait]
pub trait Assistant: Send + Sync {
    fn mode(&self) -> AssistantMode;

    /// Answer a non-empty, trimmed question.
    async fn answer(&self, question: &str) -> Result<AssistantReply, AssistantError>;
}

/// Trim and validate `question`, then hand it to `assistant`.
pub async fn answer_question(
    assistant: &dyn Assistant,
    question: &str,
) -> Result<AssistantReply, AssistantError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AssistantError::EmptyQuestion);
    }

    info!(mode = %assistant.mode(), "Answering question");
    let reply = assistant.answer(question).await?;
    info!(
        mode = %assistant.mode(),
        references = reply.references.len(),
        "Answer ready"
    );

    Ok(reply)
}

/// The assistant selected by `config.mode`.
pub fn build_assistant(config: &ServiceConfig) -> Result<Arc<dyn Assistant>, AssistantError> {
    match config.mode {
        AssistantMode::Reference => Ok(Arc::new(ReferenceAssistant::from_config(config)?)),
        AssistantMode::Literature => Ok(Arc::new(LiteratureAssistant::from_config(config))),
    }
}
