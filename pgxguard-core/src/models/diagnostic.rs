use std::fmt::{self, Display};

use serde::Serialize;

use crate::models::gene::Gene;

///
/// Non-fatal finding reported alongside a best-effort result.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// A data line was skipped.
    MalformedLine { line: usize, reason: String },
    /// A record was skipped because it did not pass its filters.
    FilteredRecord { line: usize, filter: String },
    /// No record covered any defining position of the gene.
    GeneNotCovered { gene: Gene },
    /// Several allele definitions were satisfied; `chosen` won on priority.
    AmbiguousDiplotype {
        gene: Gene,
        candidates: Vec<String>,
        chosen: String,
    },
    /// Observed variants not explained by any satisfied allele definition.
    PartialAlleleMatch {
        gene: Gene,
        unexplained: Vec<String>,
        chosen: String,
    },
    /// A covering record had a no-call genotype slot.
    NoCallGenotype { line: usize, gene: Gene },
    /// Warfarin was requested and the sample carries the VKORC1 sensitivity variant.
    WarfarinSensitivity {
        line: usize,
        rsid: String,
        genotype: String,
    },
    UnrecognizedDrug { name: String },
    DuplicateDrug { name: String },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedLine { line, reason } => {
                write!(f, "line {}: malformed record skipped: {}", line, reason)
            }
            Diagnostic::FilteredRecord { line, filter } => {
                write!(f, "line {}: record skipped, FILTER={}", line, filter)
            }
            Diagnostic::GeneNotCovered { gene } => {
                write!(f, "{}: no record covers a defining position", gene)
            }
            Diagnostic::AmbiguousDiplotype {
                gene,
                candidates,
                chosen,
            } => write!(
                f,
                "{}: allele definitions {} all satisfied, chose {}",
                gene,
                candidates.join(", "),
                chosen
            ),
            Diagnostic::PartialAlleleMatch {
                gene,
                unexplained,
                chosen,
            } => write!(
                f,
                "{}: variants {} match no complete allele definition, inferred {}",
                gene,
                unexplained.join(", "),
                chosen
            ),
            Diagnostic::NoCallGenotype { line, gene } => {
                write!(f, "line {}: no-call genotype at a {} defining position", line, gene)
            }
            Diagnostic::WarfarinSensitivity {
                line,
                rsid,
                genotype,
            } => write!(
                f,
                "line {}: VKORC1 {} genotype {} increases warfarin sensitivity",
                line, rsid, genotype
            ),
            Diagnostic::UnrecognizedDrug { name } => {
                write!(f, "drug '{}' is not in the catalog", name)
            }
            Diagnostic::DuplicateDrug { name } => {
                write!(f, "drug '{}' requested more than once", name)
            }
        }
    }
}
