use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TagError;
use crate::models::diplotype::ResolutionConfidence;
use crate::models::gene::Gene;

///
/// Metabolizer phenotype category.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phenotype {
    #[serde(alias = "PM")]
    PoorMetabolizer,
    #[serde(alias = "IM")]
    IntermediateMetabolizer,
    #[serde(alias = "NM")]
    NormalMetabolizer,
    #[serde(alias = "RM")]
    RapidMetabolizer,
    #[serde(alias = "UM", alias = "URM")]
    UltrarapidMetabolizer,
    Indeterminate,
}

impl Phenotype {
    pub const ALL: [Phenotype; 6] = [
        Phenotype::PoorMetabolizer,
        Phenotype::IntermediateMetabolizer,
        Phenotype::NormalMetabolizer,
        Phenotype::RapidMetabolizer,
        Phenotype::UltrarapidMetabolizer,
        Phenotype::Indeterminate,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Phenotype::PoorMetabolizer => "PM",
            Phenotype::IntermediateMetabolizer => "IM",
            Phenotype::NormalMetabolizer => "NM",
            Phenotype::RapidMetabolizer => "RM",
            Phenotype::UltrarapidMetabolizer => "UM",
            Phenotype::Indeterminate => "Indeterminate",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phenotype::PoorMetabolizer => "Poor Metabolizer",
            Phenotype::IntermediateMetabolizer => "Intermediate Metabolizer",
            Phenotype::NormalMetabolizer => "Normal Metabolizer",
            Phenotype::RapidMetabolizer => "Rapid Metabolizer",
            Phenotype::UltrarapidMetabolizer => "Ultrarapid Metabolizer",
            Phenotype::Indeterminate => "Indeterminate",
        }
    }

    /// Below full-normal activity.
    pub fn is_reduced(&self) -> bool {
        matches!(
            self,
            Phenotype::PoorMetabolizer | Phenotype::IntermediateMetabolizer
        )
    }
}

impl FromStr for Phenotype {
    type Err = TagError;

    /// Accepts the abbreviation, the spaced name, or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        let phenotype = match normalized.as_str() {
            "pm" | "poormetabolizer" => Phenotype::PoorMetabolizer,
            "im" | "intermediatemetabolizer" => Phenotype::IntermediateMetabolizer,
            "nm" | "normalmetabolizer" => Phenotype::NormalMetabolizer,
            "rm" | "rapidmetabolizer" => Phenotype::RapidMetabolizer,
            "um" | "urm" | "ultrarapidmetabolizer" => Phenotype::UltrarapidMetabolizer,
            "indeterminate" => Phenotype::Indeterminate,
            _ => return Err(TagError::new("phenotype", s)),
        };
        Ok(phenotype)
    }
}

impl Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// Phenotype derived from one gene's diplotype.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenotypeCall {
    pub gene: Gene,
    pub phenotype: Phenotype,
    pub activity_score: f64,
    /// Carried over from the diplotype resolution
    pub confidence: ResolutionConfidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("PM", Phenotype::PoorMetabolizer)]
    #[case("Intermediate metabolizer", Phenotype::IntermediateMetabolizer)]
    #[case("ultra-rapid metabolizer", Phenotype::UltrarapidMetabolizer)]
    #[case("URM", Phenotype::UltrarapidMetabolizer)]
    #[case("NormalMetabolizer", Phenotype::NormalMetabolizer)]
    fn test_phenotype_from_str(#[case] input: &str, #[case] expected: Phenotype) {
        assert_eq!(input.parse::<Phenotype>().unwrap(), expected);
    }

    #[rstest]
    fn test_only_poor_and_intermediate_are_reduced() {
        let reduced: Vec<Phenotype> = Phenotype::ALL
            .into_iter()
            .filter(|p| p.is_reduced())
            .collect();
        assert_eq!(
            reduced,
            vec![
                Phenotype::PoorMetabolizer,
                Phenotype::IntermediateMetabolizer
            ]
        );
    }
}
