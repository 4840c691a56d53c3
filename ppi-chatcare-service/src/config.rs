use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LLM_MODEL: &str = "google/gemini-pro-1.5";
pub const DEFAULT_PUBMED_YEARS_BACK: i32 = 5;
pub const DEFAULT_PUBMED_MAX_RESULTS: usize = 5;

/// Which assistant answers chat questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    /// Language model answers, grounded on the static guideline list.
    #[default]
    Reference,
    /// Answers assembled from a live PubMed search.
    Literature,
}

impl AssistantMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantMode::Reference => "reference",
            AssistantMode::Literature => "literature",
        }
    }
}

impl fmt::Display for AssistantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistantMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "llm" => Ok(AssistantMode::Reference),
            "literature" | "pubmed" => Ok(AssistantMode::Literature),
            other => Err(anyhow::anyhow!(
                "Unknown assistant mode '{}', expected 'reference' or 'literature'",
                other
            )),
        }
    }
}

/// Configuration for the service, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub mode: AssistantMode,
    pub openrouter_api_key: Option<String>,
    pub llm_model: String,
    pub ncbi_api_key: Option<String>,
    pub pubmed_years_back: i32,
    pub pubmed_max_results: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: AssistantMode::default(),
            openrouter_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            ncbi_api_key: None,
            pubmed_years_back: DEFAULT_PUBMED_YEARS_BACK,
            pubmed_max_results: DEFAULT_PUBMED_MAX_RESULTS,
        }
    }
}

impl ServiceConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?,
            None => defaults.port,
        };

        let mode = match non_empty("PPI_ASSISTANT_MODE") {
            Some(mode) => mode.parse()?,
            None => defaults.mode,
        };

        let pubmed_years_back = match non_empty("PUBMED_YEARS_BACK") {
            Some(years) => years
                .parse::<i32>()
                .with_context(|| format!("PUBMED_YEARS_BACK must be an integer, got '{}'", years))?,
            None => defaults.pubmed_years_back,
        };

        let pubmed_max_results = match non_empty("PUBMED_MAX_RESULTS") {
            Some(max) => max
                .parse::<usize>()
                .with_context(|| format!("PUBMED_MAX_RESULTS must be an integer, got '{}'", max))?,
            None => defaults.pubmed_max_results,
        };

        let config = Self {
            port,
            mode,
            openrouter_api_key: non_empty("OPENROUTER_API_KEY"),
            llm_model: non_empty("LLM_MODEL").unwrap_or(defaults.llm_model),
            ncbi_api_key: non_empty("NCBI_API_KEY"),
            pubmed_years_back,
            pubmed_max_results,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mode == AssistantMode::Reference && self.openrouter_api_key.is_none() {
            anyhow::bail!("OPENROUTER_API_KEY environment variable is required in reference mode");
        }
        if self.pubmed_years_back < 0 {
            anyhow::bail!("PUBMED_YEARS_BACK cannot be negative");
        }
        if self.pubmed_max_results == 0 {
            anyhow::bail!("PUBMED_MAX_RESULTS must be at least 1");
        }
        Ok(())
    }
}
