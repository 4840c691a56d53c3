//! Drug-interaction lookup for proton pump inhibitors.
//!
//! The table ships as an embedded JSON resource keyed by canonical PPI name, then by
//! canonical co-administered drug name. It is parsed once on first use and never mutated.
//! Callers are expected to canonicalize names (see [`crate::names::canonical_drug_name`])
//! before looking anything up; keys are matched exactly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{error, warn};

use crate::error::{GuidanceError, Result};
use crate::risk::RiskTier;

const BUILTIN_TABLE_JSON: &str = include_str!("../data/ppi_interactions.json");

static BUILTIN_TABLE: LazyLock<Result<InteractionTable>> = LazyLock::new(|| {
    let table = InteractionTable::from_json(BUILTIN_TABLE_JSON);
    if let Err(e) = &table {
        error!("Failed to load built-in interaction table: {}", e);
    }
    table
});

/// Highest score an authored entry may carry.
pub const MAX_SCORE: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Major,
    Moderate,
    Minor,
    None,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Major => "Major",
            Severity::Moderate => "Moderate",
            Severity::Minor => "Minor",
            Severity::None => "None",
            Severity::Unknown => "Unknown",
        }
    }

    /// Tier an authored score is expected to fall in for this severity.
    /// `Unknown` has no expectation.
    pub fn expected_tier(&self) -> Option<RiskTier> {
        match self {
            Severity::Major => Some(RiskTier::High),
            Severity::Moderate => Some(RiskTier::Moderate),
            Severity::Minor => Some(RiskTier::Low),
            Severity::None => Some(RiskTier::None),
            Severity::Unknown => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Major" => Ok(Severity::Major),
            "Moderate" => Ok(Severity::Moderate),
            "Minor" => Ok(Severity::Minor),
            "None" => Ok(Severity::None),
            "Unknown" => Ok(Severity::Unknown),
            other => Err(format!("unrecognised severity '{}'", other)),
        }
    }
}

/// Confidence in the evidence behind an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reliability {
    High,
    Moderate,
    Low,
}

impl Reliability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reliability::High => "High",
            Reliability::Moderate => "Moderate",
            Reliability::Low => "Low",
        }
    }
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reliability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "High" => Ok(Reliability::High),
            "Moderate" => Ok(Reliability::Moderate),
            "Low" => Ok(Reliability::Low),
            other => Err(format!("unrecognised reliability '{}'", other)),
        }
    }
}

/// An entry as written in the table resource.
///
/// Every field is optional here; an entry is checked when it is looked up, so a bad
/// entry only fails lookups of its own pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredEntry {
    pub mechanism: Option<String>,
    pub severity: Option<String>,
    pub reliability: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub score: Option<i64>,
    pub management: Option<String>,
}

/// A validated interaction between one PPI and one co-administered drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub mechanism: String,
    pub severity: Severity,
    pub reliability: Reliability,
    pub sources: Vec<String>,
    pub score: u8,
    pub management: String,
}

impl AuthoredEntry {
    fn validate(&self, ppi: &str, drug: &str) -> Result<InteractionRecord> {
        let malformed = |reason: String| GuidanceError::MalformedEntry {
            ppi: ppi.to_string(),
            drug: drug.to_string(),
            reason,
        };

        let mechanism = required_text(&self.mechanism, "mechanism").map_err(malformed)?;
        let management = required_text(&self.management, "management").map_err(malformed)?;

        let severity = required_text(&self.severity, "severity")
            .and_then(|s| s.parse::<Severity>())
            .map_err(malformed)?;

        let reliability = required_text(&self.reliability, "reliability")
            .and_then(|r| r.parse::<Reliability>())
            .map_err(malformed)?;

        let score = match self.score {
            Some(score) if (0..=i64::from(MAX_SCORE)).contains(&score) => score as u8,
            Some(score) => {
                return Err(malformed(format!(
                    "score {} outside 0..={}",
                    score, MAX_SCORE
                )));
            }
            None => return Err(malformed("missing field 'score'".to_string())),
        };

        Ok(InteractionRecord {
            mechanism,
            severity,
            reliability,
            sources: self.sources.clone(),
            score,
            management,
        })
    }
}

fn required_text(value: &Option<String>, field: &str) -> std::result::Result<String, String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => Err(format!("field '{}' is empty", field)),
        None => Err(format!("missing field '{}'", field)),
    }
}

/// What a lookup hands back to the caller: severity, a readable description,
/// management guidance, an evidence line and the numeric score.
///
/// `sources` is only present when the pair is documented in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReport {
    pub severity: Severity,
    pub description: String,
    pub management: String,
    pub evidence: String,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl InteractionReport {
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(i32::from(self.score))
    }

    fn unknown_ppi(ppi: &str) -> Self {
        Self {
            severity: Severity::Unknown,
            description: format!("No interaction data available for {}", ppi),
            management: "Consult healthcare provider for guidance".to_string(),
            evidence: "Not available".to_string(),
            score: 0,
            sources: None,
        }
    }

    fn undocumented(ppi: &str, other_drug: &str) -> Self {
        Self {
            severity: Severity::None,
            description: format!(
                "No known significant interactions between {} and {}",
                ppi, other_drug
            ),
            management: "Routine monitoring recommended".to_string(),
            evidence: "Based on current medical literature".to_string(),
            score: 0,
            sources: None,
        }
    }

    fn documented(ppi: &str, record: InteractionRecord) -> Self {
        Self {
            severity: record.severity,
            description: format!("{} {}", ppi, record.mechanism),
            management: record.management,
            evidence: format!("Reliability: {}", record.reliability),
            score: record.score,
            sources: Some(record.sources),
        }
    }
}

/// Outcome of a lookup. Absence of data is an `Ok` report; `Err` means the table
/// itself is broken.
pub type InteractionOutcome = Result<InteractionReport>;

/// An entry whose authored data does not hold together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    pub ppi: String,
    pub drug: String,
    pub detail: String,
}

/// PPI name to (drug name to authored entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionTable {
    entries: HashMap<String, HashMap<String, AuthoredEntry>>,
}

impl InteractionTable {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GuidanceError::TableLoad(e.to_string()))
    }

    /// The table embedded in this crate.
    pub fn builtin() -> Result<&'static InteractionTable> {
        BUILTIN_TABLE.as_ref().map_err(Clone::clone)
    }

    /// Look up the pair. First match wins: unknown PPI, documented pair, undocumented pair.
    pub fn lookup(&self, ppi: &str, other_drug: &str) -> InteractionOutcome {
        let Some(drugs) = self.entries.get(ppi) else {
            return Ok(InteractionReport::unknown_ppi(ppi));
        };

        match drugs.get(other_drug) {
            Some(entry) => entry
                .validate(ppi, other_drug)
                .map(|record| InteractionReport::documented(ppi, record))
                .map_err(|e| {
                    warn!(ppi = %ppi, other_drug = %other_drug, "Malformed interaction entry: {}", e);
                    GuidanceError::InteractionCheck {
                        ppi: ppi.to_string(),
                        other_drug: other_drug.to_string(),
                        source: Box::new(e),
                    }
                }),
            None => Ok(InteractionReport::undocumented(ppi, other_drug)),
        }
    }

    /// The validated record for a documented pair, if any.
    pub fn record(&self, ppi: &str, drug: &str) -> Option<Result<InteractionRecord>> {
        self.entries
            .get(ppi)
            .and_then(|drugs| drugs.get(drug))
            .map(|entry| entry.validate(ppi, drug))
    }

    pub fn ppis(&self) -> Vec<&str> {
        let mut ppis: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ppis.sort_unstable();
        ppis
    }

    pub fn drugs_for(&self, ppi: &str) -> Option<Vec<&str>> {
        self.entries.get(ppi).map(|drugs| {
            let mut names: Vec<&str> = drugs.keys().map(String::as_str).collect();
            names.sort_unstable();
            names
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries that fail validation or whose score falls outside the tier their
    /// severity implies. Lookups never consult this.
    pub fn consistency_report(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        for ppi in self.ppis() {
            for drug in self.drugs_for(ppi).unwrap_or_default() {
                let issue = |detail: String| ConsistencyIssue {
                    ppi: ppi.to_string(),
                    drug: drug.to_string(),
                    detail,
                };

                match self.record(ppi, drug) {
                    Some(Ok(record)) => {
                        let actual = RiskTier::from_score(i32::from(record.score));
                        if let Some(expected) = record.severity.expected_tier() {
                            if expected != actual {
                                issues.push(issue(format!(
                                    "severity {} expects a {} score, found {} ({})",
                                    record.severity, expected, record.score, actual
                                )));
                            }
                        }
                    }
                    Some(Err(e)) => issues.push(issue(e.to_string())),
                    None => {}
                }
            }
        }

        issues
    }
}

/// Look up a pair in the built-in table.
pub fn lookup_interaction(ppi: &str, other_drug: &str) -> InteractionOutcome {
    InteractionTable::builtin()
        .map_err(|e| GuidanceError::InteractionCheck {
            ppi: ppi.to_string(),
            other_drug: other_drug.to_string(),
            source: Box::new(e),
        })?
        .lookup(ppi, other_drug)
}
