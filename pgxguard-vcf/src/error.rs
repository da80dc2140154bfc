use std::io;

use pgxguard_core::Interrupted;
use thiserror::Error;

/// Fatal parser errors. Any of these aborts the run with no partial result.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input is larger than the configured ceiling.
    #[error("Input exceeds the {limit} byte size ceiling")]
    SizeExceeded { limit: usize },

    /// The declared `##fileformat` version is not accepted.
    #[error("Line {line}: unsupported format version '{found}' (accepted: {accepted})")]
    UnsupportedVersion {
        line: usize,
        found: String,
        accepted: String,
    },

    /// The header is absent or no column schema / genotype column can be established.
    #[error("Line {line}: malformed header: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
