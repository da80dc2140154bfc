pub mod diagnostic;
pub mod diplotype;
pub mod drug;
pub mod gene;
pub mod phenotype;
pub mod risk;
pub mod variant;

// re-export for cleaner imports
pub use self::diagnostic::Diagnostic;
pub use self::diplotype::{Diplotype, ResolutionConfidence};
pub use self::drug::Drug;
pub use self::gene::Gene;
pub use self::phenotype::{Phenotype, PhenotypeCall};
pub use self::risk::{
    Contributor, EvidenceLevel, InteractionSeverity, InteractionWarning, RiskClassification,
    RiskLabel, RuleRef,
};
pub use self::variant::{Genotype, VariantRecord};
