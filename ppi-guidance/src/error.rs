use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuidanceError {
    #[error("Malformed interaction entry {ppi}/{drug}: {reason}")]
    MalformedEntry {
        ppi: String,
        drug: String,
        reason: String,
    },

    #[error("Interaction table could not be loaded: {0}")]
    TableLoad(String),

    #[error("Error checking interaction between {ppi} and {other_drug}: {source}")]
    InteractionCheck {
        ppi: String,
        other_drug: String,
        #[source]
        source: Box<GuidanceError>,
    },
}

pub type Result<T> = std::result::Result<T, GuidanceError>;
