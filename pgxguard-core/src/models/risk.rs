use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::models::drug::Drug;
use crate::models::gene::Gene;
use crate::models::phenotype::Phenotype;

///
/// Per-drug risk label.
///
/// Declaration order is severity order (least severe first) and is the only
/// place severity is defined; compare labels with `Ord`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    Unknown,
    Safe,
    #[serde(alias = "Adjust Dosage")]
    AdjustDosage,
    Ineffective,
    Toxic,
}

impl Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLabel::Unknown => "Unknown",
            RiskLabel::Safe => "Safe",
            RiskLabel::AdjustDosage => "Adjust Dosage",
            RiskLabel::Ineffective => "Ineffective",
            RiskLabel::Toxic => "Toxic",
        };
        write!(f, "{}", s)
    }
}

///
/// CPIC evidence level of a guideline rule.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceLevel {
    A,
    B,
    #[serde(alias = "C", alias = "D")]
    Other,
}

impl Display for EvidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvidenceLevel::A => "A",
            EvidenceLevel::B => "B",
            EvidenceLevel::Other => "Other",
        };
        write!(f, "{}", s)
    }
}

///
/// Reference to the guideline rule a classification was taken from.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRef {
    pub gene: Gene,
    /// Phenotype key of the rule (the fallback bucket when `via_fallback`)
    pub phenotype: Phenotype,
    pub drug: Drug,
    pub risk: RiskLabel,
    pub evidence: EvidenceLevel,
    pub rationale_key: String,
    pub action_key: String,
    pub via_fallback: bool,
}

/// A gene that contributed a rule match to a classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contributor {
    pub gene: Gene,
    pub phenotype: Phenotype,
    pub diplotype: String,
}

///
/// Final per-drug result of one analysis run.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskClassification {
    /// Catalog name, or the name as requested when it is not in the catalog
    pub drug: String,
    pub risk: RiskLabel,
    /// In [0.0, 1.0]
    pub confidence: f64,
    pub evidence: Option<EvidenceLevel>,
    pub contributors: Vec<Contributor>,
    pub matched_rule: Option<RuleRef>,
}

impl RiskClassification {
    pub fn unknown(drug: &str) -> Self {
        RiskClassification {
            drug: drug.to_string(),
            risk: RiskLabel::Unknown,
            confidence: 0.0,
            evidence: None,
            contributors: Vec::new(),
            matched_rule: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum InteractionSeverity {
    Moderate,
    High,
    Critical,
}

impl InteractionSeverity {
    pub fn escalate(self) -> Self {
        match self {
            InteractionSeverity::Moderate => InteractionSeverity::High,
            InteractionSeverity::High | InteractionSeverity::Critical => {
                InteractionSeverity::Critical
            }
        }
    }
}

///
/// Two or more requested drugs relying on the same reduced-activity gene.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionWarning {
    pub gene: Gene,
    pub drugs: Vec<Drug>,
    pub phenotype: Phenotype,
    pub activity_score: f64,
    /// Fraction of normal activity missing, in [0.0, 1.0]
    pub activity_deficit: f64,
    pub severity: InteractionSeverity,
}
