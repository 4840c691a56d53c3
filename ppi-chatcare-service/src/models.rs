use ppi_guidance::{Citation, InteractionReport, RiskTier};
use serde::{Deserialize, Serialize};

use crate::config::AssistantMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchArticle {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub publication_year: Option<String>,
}

impl ResearchArticle {
    pub fn pubmed_url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pmid)
    }
}

/// A concept returned by RxNorm for a drug name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugConcept {
    pub rxcui: String,
    pub name: String,
    pub tty: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer_id: String,
    pub mode: AssistantMode,
    pub content: String,
    pub references: Vec<Citation>,
    pub clinically_relevant: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingRequest {
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InteractionCheckRequest {
    pub ppi: String,
    pub other_drug: String,
    #[serde(default)]
    pub resolve_with_rxnorm: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InteractionCheckResponse {
    pub ppi: String,
    pub other_drug: String,
    pub interaction: InteractionReport,
    pub risk_tier: RiskTier,
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InteractionCatalogueEntry {
    pub ppi: String,
    pub drugs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HandoutQuery {
    pub ppi: String,
    pub indication: String,
}
