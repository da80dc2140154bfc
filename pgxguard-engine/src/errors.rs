use pgxguard_core::Interrupted;
use pgxguard_core::models::{Drug, Gene, Phenotype};
use pgxguard_vcf::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuidelineError {
    #[error(
        "Missing or invalid file extension for guideline table. \
         It must be `toml`, `json`, `yaml` or `yml`"
    )]
    InvalidFileType,
    #[error("Duplicate guideline rule for ({gene}, {phenotype}, {drug})")]
    DuplicateRule {
        gene: Gene,
        phenotype: Phenotype,
        drug: Drug,
    },
    #[error("Guideline rule for ({gene}, {phenotype}, {drug}) cannot carry the Unknown risk label")]
    UnknownRiskLabel {
        gene: Gene,
        phenotype: Phenotype,
        drug: Drug,
    },
    #[error("Guideline text key '{0}' has no text")]
    MissingText(String),
    #[error("Guideline citation names a drug outside the catalog: {0}")]
    UnknownSourceDrug(String),
    #[error("Guideline fallback action names a drug outside the catalog: {0}")]
    UnknownFallbackDrug(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid pipeline config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Errors that end an analysis run without a result.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("No drugs requested")]
    NoDrugsRequested,
    #[error("None of the requested drugs are in the catalog: {}", .requested.join(", "))]
    NoRecognizedDrugs { requested: Vec<String> },
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// Result type alias for guideline table operations.
pub type GuidelineResult<T> = std::result::Result<T, GuidelineError>;
