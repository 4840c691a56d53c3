//! PubMed E-utilities client: `esearch` for PMIDs, then `efetch` for article XML.

use chrono::Datelike;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::models::ResearchArticle;

pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Authors listed before the list is cut to "et al."
const MAX_LISTED_AUTHORS: usize = 3;

#[derive(Clone)]
pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    years_back: i32,
    max_results: usize,
}

impl PubMedClient {
    pub fn new(api_key: Option<String>, years_back: i32, max_results: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: EUTILS_BASE_URL.to_string(),
            api_key,
            years_back,
            max_results,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.ncbi_api_key.clone(),
            config.pubmed_years_back,
            config.pubmed_max_results,
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search PubMed and fetch details for the matching articles.
    pub async fn search(&self, term: &str) -> anyhow::Result<Vec<ResearchArticle>> {
        let pmids = self.search_ids(term).await?;

        if pmids.is_empty() {
            info!(term = %term, "PubMed search found no articles");
            return Ok(Vec::new());
        }

        info!(
            term = %term,
            found = pmids.len(),
            "PubMed search found articles, fetching details"
        );
        self.fetch_articles(&pmids).await
    }

    async fn search_ids(&self, term: &str) -> anyhow::Result<Vec<String>> {
        let current_year = chrono::Utc::now().year();

        let mut search_url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&datetype=pdat&mindate={}&maxdate={}&retmax={}&retmode=json&sort=relevance",
            self.base_url,
            urlencoding::encode(term),
            current_year - self.years_back,
            current_year,
            self.max_results
        );
        if let Some(key) = &self.api_key {
            search_url.push_str(&format!("&api_key={}", urlencoding::encode(key)));
        }

        let search_data: Value = self
            .client
            .get(&search_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| anyhow::anyhow!("PubMed search request failed: {}", e))?
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse search response: {}", e))?;

        let pmids = parse_esearch_ids(&search_data)?;
        debug!(?pmids, "PubMed esearch returned PMIDs");
        Ok(pmids)
    }

    async fn fetch_articles(&self, pmids: &[String]) -> anyhow::Result<Vec<ResearchArticle>> {
        let mut fetch_url = format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml",
            self.base_url,
            pmids.join(",")
        );
        if let Some(key) = &self.api_key {
            fetch_url.push_str(&format!("&api_key={}", urlencoding::encode(key)));
        }

        let xml_content = self
            .client
            .get(&fetch_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| anyhow::anyhow!("PubMed fetch request failed: {}", e))?
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get fetch response text: {}", e))?;

        parse_pubmed_xml(&xml_content)
    }
}

/// PubMed query for a free-text question, scoped to proton pump inhibitors.
pub fn build_search_term(question: &str) -> String {
    format!(
        r#"({}) AND ("proton pump inhibitors"[MeSH Terms] OR "proton pump inhibitor")"#,
        question.trim()
    )
}

fn parse_esearch_ids(search_data: &Value) -> anyhow::Result<Vec<String>> {
    let ids = search_data["esearchresult"]["idlist"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("No PMID list in search results"))?;

    Ok(ids
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}

#[derive(Default)]
struct AuthorName {
    last_name: String,
    initials: String,
}

#[derive(Default)]
struct ArticleBuilder {
    pmid: String,
    title: String,
    abstract_text: String,
    journal: String,
    year: String,
    authors: Vec<AuthorName>,
}

fn append_text(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

impl ArticleBuilder {
    fn absorb(&mut self, path: &[String], text: &str) {
        let within = |tag: &str| path.iter().any(|p| p == tag);
        let leaf = path.last().map(String::as_str).unwrap_or_default();
        let parent = path
            .len()
            .checked_sub(2)
            .and_then(|i| path.get(i))
            .map(String::as_str)
            .unwrap_or_default();

        if within("ArticleTitle") {
            append_text(&mut self.title, text);
        } else if within("AbstractText") {
            append_text(&mut self.abstract_text, text);
        } else if leaf == "PMID" && parent == "MedlineCitation" && self.pmid.is_empty() {
            self.pmid = text.to_string();
        } else if within("Journal") && leaf == "Title" {
            append_text(&mut self.journal, text);
        } else if within("PubDate") {
            match leaf {
                "Year" => self.year = text.to_string(),
                // e.g. "2021 Jan-Feb"
                "MedlineDate" if self.year.is_empty() => {
                    self.year = text.chars().take(4).collect();
                }
                _ => {}
            }
        } else if within("Author") {
            if let Some(author) = self.authors.last_mut() {
                match leaf {
                    "LastName" | "CollectiveName" => author.last_name = text.to_string(),
                    "Initials" => author.initials = text.to_string(),
                    _ => {}
                }
            }
        }
    }

    fn finish(self) -> Option<ResearchArticle> {
        if self.pmid.is_empty() || self.title.is_empty() {
            return None;
        }

        let names: Vec<String> = self
            .authors
            .iter()
            .filter(|a| !a.last_name.is_empty())
            .map(|a| {
                if a.initials.is_empty() {
                    a.last_name.clone()
                } else {
                    format!("{} {}", a.last_name, a.initials)
                }
            })
            .collect();

        let authors = match names.len() {
            0 => None,
            n if n > MAX_LISTED_AUTHORS => {
                Some(format!("{}, et al.", names[..MAX_LISTED_AUTHORS].join(", ")))
            }
            _ => Some(names.join(", ")),
        };

        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        Some(ResearchArticle {
            pmid: self.pmid,
            title: self.title,
            abstract_text: self.abstract_text,
            authors,
            journal: non_empty(self.journal),
            publication_year: non_empty(self.year),
        })
    }
}

/// Parse an `efetch` PubmedArticleSet into articles. Articles without a PMID or
/// title are skipped.
pub fn parse_pubmed_xml(xml: &str) -> anyhow::Result<Vec<ResearchArticle>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut current: Option<ArticleBuilder> = None;
    let mut path: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "PubmedArticle" => current = Some(ArticleBuilder::default()),
                    "Author" => {
                        if let Some(article) = current.as_mut() {
                            article.authors.push(AuthorName::default());
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(article) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default();
                    article.absorb(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("PubmedArticle") {
                    match current.take().and_then(ArticleBuilder::finish) {
                        Some(article) => articles.push(article),
                        None => warn!("Skipping PubMed article without PMID or title"),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to parse PubMed XML at position {}: {}",
                    reader.error_position(),
                    e
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EFETCH_XML: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">20608754</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2010</Year><Month>Jul</Month></PubDate>
          </JournalIssue>
          <Title>The American journal of gastroenterology</Title>
        </Journal>
        <ArticleTitle>Omeprazole and clopidogrel: an <i>in vitro</i> interaction study.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Clopidogrel is a prodrug.</AbstractText>
          <AbstractText Label="RESULTS">Omeprazole reduced activation &amp; platelet inhibition.</AbstractText>
        </Abstract>
        <AuthorList>
          <Author><LastName>Smith</LastName><ForeName>John</ForeName><Initials>J</Initials></Author>
          <Author><LastName>Doe</LastName><Initials>A</Initials></Author>
          <Author><LastName>Roe</LastName><Initials>R</Initials></Author>
          <Author><LastName>Poe</LastName><Initials>E</Initials></Author>
        </AuthorList>
      </Article>
      <CommentsCorrectionsList>
        <CommentsCorrections RefType="Cites"><PMID Version="1">11111111</PMID></CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">30000001</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><MedlineDate>2021 Jan-Feb</MedlineDate></PubDate></JournalIssue>
          <Title>Gut</Title>
        </Journal>
        <ArticleTitle>Deprescribing proton pump inhibitors.</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <Article><ArticleTitle>No identifier</ArticleTitle></Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_pubmed_articles() {
        let articles = parse_pubmed_xml(EFETCH_XML).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.pmid, "20608754");
        assert_eq!(
            first.title,
            "Omeprazole and clopidogrel: an in vitro interaction study."
        );
        assert_eq!(
            first.abstract_text,
            "Clopidogrel is a prodrug. Omeprazole reduced activation & platelet inhibition."
        );
        assert_eq!(
            first.journal.as_deref(),
            Some("The American journal of gastroenterology")
        );
        assert_eq!(first.publication_year.as_deref(), Some("2010"));
        assert_eq!(first.authors.as_deref(), Some("Smith J, Doe A, Roe R, et al."));
        assert_eq!(first.pubmed_url(), "https://pubmed.ncbi.nlm.nih.gov/20608754/");

        let second = &articles[1];
        assert_eq!(second.publication_year.as_deref(), Some("2021"));
        assert_eq!(second.authors, None);
        assert!(second.abstract_text.is_empty());
    }

    #[test]
    fn test_parse_empty_article_set() {
        let articles = parse_pubmed_xml("<PubmedArticleSet></PubmedArticleSet>").unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_parse_esearch_ids() {
        let data = serde_json::json!({
            "esearchresult": { "count": "2", "idlist": ["38000001", "37000002"] }
        });
        assert_eq!(
            parse_esearch_ids(&data).unwrap(),
            vec!["38000001".to_string(), "37000002".to_string()]
        );

        let error = serde_json::json!({ "error": "API rate limit exceeded" });
        assert!(parse_esearch_ids(&error).is_err());
    }

    #[test]
    fn test_search_term_scopes_to_ppis() {
        assert_eq!(
            build_search_term("  long-term omeprazole and fractures "),
            r#"(long-term omeprazole and fractures) AND ("proton pump inhibitors"[MeSH Terms] OR "proton pump inhibitor")"#
        );
    }
}
