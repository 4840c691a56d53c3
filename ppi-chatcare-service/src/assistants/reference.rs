use async_trait::async_trait;
use ppi_guidance::{extract_citations, reference::guideline_bullets};
use rig::{agent::Agent, completion::Prompt, providers::openrouter};
use tracing::{error, info};

use super::utils::get_llm_agent;
use super::{Assistant, AssistantError, AssistantReply};
use crate::config::{AssistantMode, ServiceConfig};

/// Answers questions with a language model, steered towards the key PPI guidelines
/// and asked to cite sources in the `[n] ...` convention.
pub struct ReferenceAssistant {
    agent: Agent<openrouter::CompletionModel>,
    model: String,
}

impl ReferenceAssistant {
    /// Build the agent once; every question reuses its client.
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            agent: get_llm_agent(api_key, &model, &system_prompt()),
            model,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, AssistantError> {
        let api_key = config.openrouter_api_key.as_deref().ok_or_else(|| {
            AssistantError::MissingConfig("OPENROUTER_API_KEY not set".to_string())
        })?;
        Ok(Self::new(api_key, config.llm_model.clone()))
    }
}

pub fn system_prompt() -> String {
    format!(
        r#"You are a medical information specialist focusing on Proton Pump Inhibitors (PPIs).
Provide detailed, evidence-based responses with specific references. For each response:
1. Include relevant clinical guidelines (e.g., ACG, AGA)
2. Cite specific studies or meta-analyses when available
3. Provide direct links to sources (PubMed, DOI, or official guideline websites)
4. Format references as: [Reference #] Title, Authors, Journal, Year, Link

Current guidelines to reference:
{}"#,
        guideline_bullets()
    )
}

pub fn question_prompt(question: &str) -> String {
    format!(
        "Question: {}\nProvide a detailed response with references and direct links:",
        question
    )
}

#[async_trait]
impl Assistant for ReferenceAssistant {
    fn mode(&self) -> AssistantMode {
        AssistantMode::Reference
    }

    async fn answer(&self, question: &str) -> Result<AssistantReply, AssistantError> {
        info!(model = %self.model, "Requesting referenced answer from language model");

        let response = self.agent.prompt(question_prompt(question)).await.map_err(|e| {
            error!("Language model request failed: {}", e);
            AssistantError::Llm(e.to_string())
        })?;

        let references = extract_citations(&response);

        Ok(AssistantReply {
            content: response,
            references,
        })
    }
}
