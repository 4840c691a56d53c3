pub mod citations;
pub mod error;
pub mod handout;
pub mod interactions;
pub mod names;
pub mod reference;
pub mod response;
pub mod risk;

// Re-export commonly used types
pub use citations::{Citation, extract_citations};
pub use error::{GuidanceError, Result};
pub use handout::{
    SUPPORTED_INDICATIONS, SUPPORTED_PPIS, generate_patient_handout, handout_file_name,
};
pub use interactions::{
    InteractionOutcome, InteractionRecord, InteractionReport, InteractionTable, Reliability,
    Severity, lookup_interaction,
};
pub use names::canonical_drug_name;
pub use response::{format_response, is_clinically_relevant};
pub use risk::{RiskTier, severity_color};
