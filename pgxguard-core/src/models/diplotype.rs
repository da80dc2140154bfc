use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::models::gene::Gene;

///
/// How firmly a diplotype was resolved.
///
/// The derived ordering runs from weakest to strongest, so the weaker of two
/// confidences is simply `a.min(b)`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolutionConfidence {
    /// No record covered any defining position of the gene.
    NoCall,
    /// Observed variants satisfied several competing allele definitions.
    Ambiguous,
    /// Observed variants only partially matched an allele definition, or
    /// some covering genotype slots were no-calls.
    Inferred,
    Confirmed,
}

impl Display for ResolutionConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionConfidence::NoCall => "NoCall",
            ResolutionConfidence::Ambiguous => "Ambiguous",
            ResolutionConfidence::Inferred => "Inferred",
            ResolutionConfidence::Confirmed => "Confirmed",
        };
        write!(f, "{}", s)
    }
}

///
/// Pair of star-allele calls for one gene, one per analysis run.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diplotype {
    pub gene: Gene,
    pub alleles: [String; 2],
    pub confidence: ResolutionConfidence,
    /// Number of records that covered a defining position of the gene
    pub covering_records: usize,
    /// Normalized QUAL/depth score of the covering records, if any
    pub call_quality: Option<f64>,
}

impl Diplotype {
    pub fn label(&self) -> String {
        format!("{}/{}", self.alleles[0], self.alleles[1])
    }
}

impl Display for Diplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.gene, self.label(), self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    fn test_confidence_ordering_weakest_first() {
        assert!(ResolutionConfidence::NoCall < ResolutionConfidence::Ambiguous);
        assert!(ResolutionConfidence::Ambiguous < ResolutionConfidence::Inferred);
        assert!(ResolutionConfidence::Inferred < ResolutionConfidence::Confirmed);
        assert_eq!(
            ResolutionConfidence::Confirmed.min(ResolutionConfidence::Inferred),
            ResolutionConfidence::Inferred
        );
    }
}
