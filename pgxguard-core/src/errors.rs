use thiserror::Error;

/// A string did not name any member of one of the closed tag sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized {kind}: '{value}'")]
pub struct TagError {
    pub kind: &'static str,
    pub value: String,
}

impl TagError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        TagError {
            kind,
            value: value.to_string(),
        }
    }
}

/// The caller asked the run to stop (deadline passed or cancel flag raised).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Analysis run interrupted before completion")]
pub struct Interrupted;
