use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TagError;
use crate::models::gene::Gene;

///
/// The fixed ten-drug catalog.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Drug {
    Codeine,
    Fluoxetine,
    Paroxetine,
    Risperidone,
    Clopidogrel,
    Omeprazole,
    Warfarin,
    Simvastatin,
    Azathioprine,
    Fluorouracil,
}

impl Drug {
    pub const ALL: [Drug; 10] = [
        Drug::Codeine,
        Drug::Fluoxetine,
        Drug::Paroxetine,
        Drug::Risperidone,
        Drug::Clopidogrel,
        Drug::Omeprazole,
        Drug::Warfarin,
        Drug::Simvastatin,
        Drug::Azathioprine,
        Drug::Fluorouracil,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Drug::Codeine => "Codeine",
            Drug::Fluoxetine => "Fluoxetine",
            Drug::Paroxetine => "Paroxetine",
            Drug::Risperidone => "Risperidone",
            Drug::Clopidogrel => "Clopidogrel",
            Drug::Omeprazole => "Omeprazole",
            Drug::Warfarin => "Warfarin",
            Drug::Simvastatin => "Simvastatin",
            Drug::Azathioprine => "Azathioprine",
            Drug::Fluorouracil => "Fluorouracil",
        }
    }

    /// The enzyme or transporter the catalog lists for this drug.
    ///
    /// Informational only: which genes actually contribute to a
    /// classification is decided by the guideline table.
    pub fn primary_gene(&self) -> Gene {
        match self {
            Drug::Codeine | Drug::Fluoxetine | Drug::Paroxetine | Drug::Risperidone => {
                Gene::Cyp2d6
            }
            Drug::Clopidogrel | Drug::Omeprazole => Gene::Cyp2c19,
            Drug::Warfarin => Gene::Cyp2c9,
            Drug::Simvastatin => Gene::Slco1b1,
            Drug::Azathioprine => Gene::Tpmt,
            Drug::Fluorouracil => Gene::Dpyd,
        }
    }
}

impl FromStr for Drug {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Drug::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TagError::new("drug", s))
    }
}

impl Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
