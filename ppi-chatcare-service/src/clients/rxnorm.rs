use serde_json::Value;
use tracing::{debug, info};

use crate::models::DrugConcept;

pub const RXNAV_BASE_URL: &str = "https://rxnav.nlm.nih.gov/REST";

/// RxNorm (RxNav REST) lookups used to normalise free-text drug names.
#[derive(Clone)]
pub struct RxNormClient {
    client: reqwest::Client,
    base_url: String,
}

impl RxNormClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: RXNAV_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Best RxNorm concept for `name`, or `None` when RxNorm has no candidate.
    pub async fn resolve(&self, name: &str) -> anyhow::Result<Option<DrugConcept>> {
        let Some(rxcui) = self.approximate_rxcui(name).await? else {
            info!(name = %name, "RxNorm has no candidate for drug name");
            return Ok(None);
        };

        let url = format!("{}/rxcui/{}/properties.json", self.base_url, rxcui);
        let properties = self.get_json(&url).await?;
        let concept = parse_properties(&properties);

        debug!(name = %name, rxcui = %rxcui, ?concept, "RxNorm concept resolved");
        Ok(concept)
    }

    /// Ingredient concepts (`tty=IN`) related to `rxcui`, e.g. clopidogrel for Plavix.
    pub async fn ingredients(&self, rxcui: &str) -> anyhow::Result<Vec<DrugConcept>> {
        let url = format!(
            "{}/rxcui/{}/related.json?tty=IN",
            self.base_url,
            urlencoding::encode(rxcui)
        );
        let related = self.get_json(&url).await?;
        Ok(parse_related_ingredients(&related))
    }

    async fn approximate_rxcui(&self, name: &str) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/approximateTerm.json?term={}&maxEntries=1",
            self.base_url,
            urlencoding::encode(name.trim())
        );
        let data = self.get_json(&url).await?;
        Ok(parse_approximate_term(&data))
    }

    async fn get_json(&self, url: &str) -> anyhow::Result<Value> {
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| anyhow::anyhow!("RxNorm request failed: {}", e))?
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse RxNorm response: {}", e))
    }
}

impl Default for RxNormClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_approximate_term(data: &Value) -> Option<String> {
    data["approximateGroup"]["candidate"]
        .as_array()?
        .iter()
        .filter(|c| c["source"].as_str().is_none_or(|s| s == "RXNORM"))
        .filter_map(|c| c["rxcui"].as_str())
        .find(|rxcui| !rxcui.is_empty())
        .map(String::from)
}

fn parse_properties(data: &Value) -> Option<DrugConcept> {
    let properties = &data["properties"];
    let rxcui = properties["rxcui"].as_str()?;
    let name = properties["name"].as_str()?;

    Some(DrugConcept {
        rxcui: rxcui.to_string(),
        name: name.to_string(),
        tty: properties["tty"].as_str().map(String::from),
    })
}

fn parse_related_ingredients(data: &Value) -> Vec<DrugConcept> {
    let Some(groups) = data["relatedGroup"]["conceptGroup"].as_array() else {
        return Vec::new();
    };

    groups
        .iter()
        .filter(|g| g["tty"].as_str() == Some("IN"))
        .filter_map(|g| g["conceptProperties"].as_array())
        .flatten()
        .filter_map(|c| {
            Some(DrugConcept {
                rxcui: c["rxcui"].as_str()?.to_string(),
                name: c["name"].as_str()?.to_string(),
                tty: Some("IN".to_string()),
            })
        })
        .collect()
}
