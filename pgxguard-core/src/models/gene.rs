use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TagError;

///
/// The six tracked pharmacogenes.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gene {
    #[serde(rename = "CYP2D6")]
    Cyp2d6,
    #[serde(rename = "CYP2C19")]
    Cyp2c19,
    #[serde(rename = "CYP2C9")]
    Cyp2c9,
    #[serde(rename = "SLCO1B1")]
    Slco1b1,
    #[serde(rename = "TPMT")]
    Tpmt,
    #[serde(rename = "DPYD")]
    Dpyd,
}

impl Gene {
    pub const ALL: [Gene; 6] = [
        Gene::Cyp2d6,
        Gene::Cyp2c19,
        Gene::Cyp2c9,
        Gene::Slco1b1,
        Gene::Tpmt,
        Gene::Dpyd,
    ];

    /// HGNC symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Gene::Cyp2d6 => "CYP2D6",
            Gene::Cyp2c19 => "CYP2C19",
            Gene::Cyp2c9 => "CYP2C9",
            Gene::Slco1b1 => "SLCO1B1",
            Gene::Tpmt => "TPMT",
            Gene::Dpyd => "DPYD",
        }
    }

    /// Chromosome the gene sits on, without a `chr` prefix.
    pub fn chromosome(&self) -> &'static str {
        match self {
            Gene::Cyp2d6 => "22",
            Gene::Cyp2c19 | Gene::Cyp2c9 => "10",
            Gene::Slco1b1 => "12",
            Gene::Tpmt => "6",
            Gene::Dpyd => "1",
        }
    }
}

impl FromStr for Gene {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Gene::ALL
            .into_iter()
            .find(|g| g.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TagError::new("gene", s))
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("CYP2D6", Gene::Cyp2d6)]
    #[case("cyp2c19", Gene::Cyp2c19)]
    #[case(" TPMT ", Gene::Tpmt)]
    fn test_gene_from_str(#[case] input: &str, #[case] expected: Gene) {
        assert_eq!(input.parse::<Gene>().unwrap(), expected);
    }

    #[rstest]
    fn test_untracked_gene_is_rejected() {
        let err = "VKORC1".parse::<Gene>().unwrap_err();
        assert_eq!(err.kind, "gene");
    }

    #[rstest]
    fn test_gene_serializes_as_symbol() {
        let json = serde_json::to_string(&Gene::Slco1b1).unwrap();
        assert_eq!(json, "\"SLCO1B1\"");
    }
}
