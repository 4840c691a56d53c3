use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `[digits]`, optional whitespace, then everything up to the next newline.
static CITATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]\s*([^\n]*)").expect("Invalid citation regex"));

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("Invalid URL regex"));

static URL_WITH_LEADING_SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*https?://\S+").expect("Invalid URL regex"));

/// A reference parsed out of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Label exactly as it appeared between the brackets.
    pub number: String,
    pub text: String,
    pub url: Option<String>,
}

/// Scan `text` for `[n] reference text` lines.
///
/// Citations come back in the order they appear. Repeated labels are kept as separate
/// entries. Only the first URL in a reference is lifted into `url`; later ones stay in
/// the text.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    CITATION_REGEX
        .captures_iter(text)
        .map(|caps| {
            let number = caps[1].to_string();
            let trailing = &caps[2];

            match URL_REGEX.find(trailing) {
                Some(url) => Citation {
                    number,
                    text: URL_WITH_LEADING_SPACE_REGEX
                        .replace(trailing, "")
                        .trim()
                        .to_string(),
                    url: Some(url.as_str().to_string()),
                },
                None => Citation {
                    number,
                    text: trailing.trim().to_string(),
                    url: None,
                },
            }
        })
        .collect()
}
