use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic risk band for an interaction score.
///
/// The band says how worried a reader should be, not how to draw it; mapping a
/// tier to a colour belongs to whoever renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    High,
    Moderate,
    Low,
    None,
}

impl RiskTier {
    /// Bands are closed on their lower bound: 8 is `High`, 5 is `Moderate`.
    pub fn from_score(score: i32) -> Self {
        if score >= 8 {
            RiskTier::High
        } else if score >= 5 {
            RiskTier::Moderate
        } else if score > 0 {
            RiskTier::Low
        } else {
            RiskTier::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::High => "HIGH",
            RiskTier::Moderate => "MODERATE",
            RiskTier::Low => "LOW",
            RiskTier::None => "NONE",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an interaction score into its risk tier.
pub fn severity_color(score: i32) -> RiskTier {
    RiskTier::from_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(severity_color(9), RiskTier::High);
        assert_eq!(severity_color(8), RiskTier::High);
        assert_eq!(severity_color(7), RiskTier::Moderate);
        assert_eq!(severity_color(5), RiskTier::Moderate);
        assert_eq!(severity_color(4), RiskTier::Low);
        assert_eq!(severity_color(1), RiskTier::Low);
        assert_eq!(severity_color(0), RiskTier::None);
        assert_eq!(severity_color(-1), RiskTier::None);
        assert_eq!(severity_color(i32::MIN), RiskTier::None);
    }

    #[test]
    fn test_serializes_as_uppercase_token() {
        assert_eq!(
            serde_json::to_value(RiskTier::Moderate).unwrap(),
            serde_json::json!("MODERATE")
        );
        assert_eq!(RiskTier::High.to_string(), "HIGH");
    }
}
