pub mod pubmed;
pub mod rxnorm;

pub use pubmed::PubMedClient;
pub use rxnorm::RxNormClient;
