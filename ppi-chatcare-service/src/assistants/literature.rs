use async_trait::async_trait;
use ppi_guidance::extract_citations;
use tracing::{error, info};

use super::{Assistant, AssistantError, AssistantReply};
use crate::clients::PubMedClient;
use crate::clients::pubmed::build_search_term;
use crate::config::{AssistantMode, ServiceConfig};
use crate::models::ResearchArticle;

pub const NO_LITERATURE_ANSWER: &str =
    "No recent relevant PubMed literature was found for this question. Consider rephrasing it or consulting the key guidelines.";

const ABSTRACT_EXCERPT_CHARS: usize = 400;

/// Answers questions from a live PubMed search instead of a language model.
pub struct LiteratureAssistant {
    pubmed: PubMedClient,
}

impl LiteratureAssistant {
    pub fn new(pubmed: PubMedClient) -> Self {
        Self { pubmed }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(PubMedClient::from_config(config))
    }
}

#[async_trait]
impl Assistant for LiteratureAssistant {
    fn mode(&self) -> AssistantMode {
        AssistantMode::Literature
    }

    async fn answer(&self, question: &str) -> Result<AssistantReply, AssistantError> {
        let term = build_search_term(question);
        info!(term = %term, "Searching PubMed for question");

        let articles = self.pubmed.search(&term).await.map_err(|e| {
            error!("PubMed search failed: {}", e);
            AssistantError::Literature(e.to_string())
        })?;

        let content = compose_literature_answer(question, &articles);
        let references = extract_citations(&content);

        Ok(AssistantReply {
            content,
            references,
        })
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn excerpt(text: &str) -> String {
    let text = single_line(text);
    if text.chars().count() <= ABSTRACT_EXCERPT_CHARS {
        return text;
    }
    let cut: String = text.chars().take(ABSTRACT_EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn reference_line(index: usize, article: &ResearchArticle) -> String {
    let title = single_line(&article.title);
    let parts: Vec<String> = [
        Some(title.trim_end_matches('.').to_string()),
        article.authors.as_deref().map(single_line),
        article.journal.as_deref().map(single_line),
        article.publication_year.clone(),
    ]
    .into_iter()
    .flatten()
    .filter(|p| !p.is_empty())
    .collect();

    format!("[{}] {} {}", index, parts.join(", "), article.pubmed_url())
}

/// Answer text for a set of articles: a short digest of each article followed by a
/// `[n] ...` reference block that [`extract_citations`] can read back.
pub fn compose_literature_answer(question: &str, articles: &[ResearchArticle]) -> String {
    if articles.is_empty() {
        return NO_LITERATURE_ANSWER.to_string();
    }

    let mut answer = format!("Recent PubMed literature on: {}\n\n", single_line(question));

    for (i, article) in articles.iter().enumerate() {
        answer.push_str(&format!("{}. **{}**\n", i + 1, single_line(&article.title)));

        let source = match (&article.journal, &article.publication_year) {
            (Some(journal), Some(year)) => Some(format!("{} ({})", single_line(journal), year)),
            (Some(journal), None) => Some(single_line(journal)),
            (None, Some(year)) => Some(year.clone()),
            (None, None) => None,
        };
        if let Some(source) = source {
            answer.push_str(&format!("   {}\n", source));
        }
        if !article.abstract_text.trim().is_empty() {
            answer.push_str(&format!("   {}\n", excerpt(&article.abstract_text)));
        }
        answer.push('\n');
    }

    answer.push_str("References:\n");
    let references = articles
        .iter()
        .enumerate()
        .map(|(i, article)| reference_line(i + 1, article))
        .collect::<Vec<_>>()
        .join("\n");
    answer.push_str(&references);

    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(pmid: &str, title: &str) -> ResearchArticle {
        ResearchArticle {
            pmid: pmid.to_string(),
            title: title.to_string(),
            abstract_text: "Long-term PPI use was associated with fractures.".to_string(),
            authors: Some("Smith J, Doe A".to_string()),
            journal: Some("Gut".to_string()),
            publication_year: Some("2023".to_string()),
        }
    }

    #[test]
    fn test_no_articles() {
        assert_eq!(
            compose_literature_answer("anything", &[]),
            NO_LITERATURE_ANSWER
        );
        assert!(extract_citations(NO_LITERATURE_ANSWER).is_empty());
    }

    #[test]
    fn test_answer_references_round_trip_through_extractor() {
        let articles = vec![
            article("111", "PPIs and fracture risk."),
            ResearchArticle {
                authors: None,
                journal: None,
                ..article("222", "Deprescribing\nPPIs")
            },
        ];

        let content = compose_literature_answer("fracture risk", &articles);
        let references = extract_citations(&content);

        assert_eq!(references.len(), 2);
        assert_eq!(references[0].number, "1");
        assert_eq!(references[0].text, "PPIs and fracture risk, Smith J, Doe A, Gut, 2023");
        assert_eq!(
            references[0].url.as_deref(),
            Some("https://pubmed.ncbi.nlm.nih.gov/111/")
        );
        assert_eq!(references[1].text, "Deprescribing PPIs, 2023");
        assert!(content.contains("1. **PPIs and fracture risk.**\n   Gut (2023)\n"));
    }

    #[test]
    fn test_long_abstracts_are_cut() {
        let long = "word ".repeat(200);
        let cut = excerpt(&long);

        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= ABSTRACT_EXCERPT_CHARS + 3);
    }
}
