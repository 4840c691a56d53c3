/// Phrases an answer about PPI management is expected to touch on.
const CLINICAL_KEYWORDS: [&str; 6] = [
    "dose",
    "interaction",
    "side effect",
    "mechanism",
    "contraindication",
    "guideline",
];

/// Whether a generated answer mentions any clinical topic at all.
pub fn is_clinically_relevant(response: &str) -> bool {
    let lowered = response.to_lowercase();
    CLINICAL_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Break dash- and semicolon-separated runs into bullet lines.
pub fn format_response(response: &str) -> String {
    response.replace(" - ", ":\n• ").replace("; ", "\n• ")
}
