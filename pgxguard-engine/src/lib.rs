//! # pgxguard-engine
//!
//! The inference half of the pgxguard pipeline. Starting from parsed variant
//! records it:
//!
//! 1. resolves a star-allele diplotype per tracked gene ([`resolver`]) using
//!    the static GRCh38 allele tables ([`loci`])
//! 2. maps each diplotype to a metabolizer phenotype through per-gene activity
//!    scores ([`classifier`])
//! 3. looks up `(gene, phenotype, drug)` guideline rules ([`guidelines`], [`rules`])
//! 4. folds the matches into one risk classification per drug and scans the
//!    request for shared-enzyme bottlenecks ([`aggregator`])
//!
//! [`analyze`] runs all four steps on one request, and [`explain::explain`]
//! renders any classification of the resulting report as plain text.
//!
//! All static tables live in an [`AnalysisContext`] that is built once and
//! shared read-only by every run.
//!
//! # Example
//!
//! ```no_run
//! use pgxguard_core::RunControl;
//! use pgxguard_engine::{AnalysisContext, AnalysisRequest, analyze};
//!
//! let ctx = AnalysisContext::with_defaults().unwrap();
//! let content = std::fs::read("sample.vcf").unwrap();
//! let request = AnalysisRequest::new(&content, vec!["Codeine".to_string()]);
//!
//! let report = analyze(&ctx, &request, &RunControl::unbounded()).unwrap();
//! for c in &report.classifications {
//!     println!("{}: {} ({:.2})", c.drug, c.risk, c.confidence);
//! }
//! ```

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod config;
pub mod context;
pub mod errors;
pub mod explain;
pub mod guidelines;
pub mod loci;
pub mod quality;
pub mod resolver;
pub mod rules;

// re-exports
pub use analysis::{AnalysisReport, AnalysisRequest, GeneReport, analyze};
pub use config::PipelineConfig;
pub use context::AnalysisContext;
pub use errors::{AnalysisError, ConfigError, GuidelineError};
pub use guidelines::{GuidelineRule, GuidelineTable};
pub use loci::{GeneLocus, LocusIndex};
