//! # pgxguard-core
//!
//! Shared building blocks for the pgxguard pharmacogenomic pipeline:
//!
//! - closed tag enums for the tracked genes, the drug catalog, metabolizer
//!   phenotypes, risk labels and guideline evidence levels
//! - the run-scoped records handed between pipeline stages (variant records,
//!   diplotypes, phenotype calls, risk classifications, interaction warnings)
//! - diagnostics that are reported alongside a best-effort result
//! - [`RunControl`], the cooperative interruption check used at loop boundaries

pub mod control;
pub mod errors;
pub mod models;

// re-exports
pub use control::RunControl;
pub use errors::{Interrupted, TagError};
