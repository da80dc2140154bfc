use crate::error::{ParseError, ParseResult};

pub const FIXED_COLUMNS: [&str; 8] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO",
];
pub const FORMAT_COLUMN: &str = "FORMAT";

///
/// Header of a parsed file: declared version, `##` metadata lines and the
/// sample selected for genotype extraction.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfHeader {
    pub version: String,
    pub meta: Vec<(String, String)>,
    pub samples: Vec<String>,
    /// Index into `samples` of the genotype column being read
    pub sample_index: usize,
}

impl VcfHeader {
    pub fn sample_name(&self) -> &str {
        &self.samples[self.sample_index]
    }

    /// Total number of tab-separated columns a data line must have.
    pub fn column_count(&self) -> usize {
        FIXED_COLUMNS.len() + 1 + self.samples.len()
    }

    /// First value of a `##key=value` metadata line.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

///
/// Validate the `##fileformat=` value against the accepted set and, when the
/// caller declared one, the expected version tag.
///
pub fn check_version(
    found: &str,
    line: usize,
    supported: &[String],
    expected: Option<&str>,
) -> ParseResult<()> {
    if let Some(expected) = expected {
        if found != expected {
            return Err(ParseError::UnsupportedVersion {
                line,
                found: found.to_string(),
                accepted: expected.to_string(),
            });
        }
    }
    if !supported.iter().any(|v| v == found) {
        return Err(ParseError::UnsupportedVersion {
            line,
            found: found.to_string(),
            accepted: supported.join(", "),
        });
    }
    Ok(())
}

///
/// Establish the column schema from the `#CHROM` line and pick the sample
/// whose genotypes will be read.
///
/// # Returns
/// - the sample names and the index of the selected sample
///
pub fn parse_column_header(
    line: &str,
    line_no: usize,
    wanted_sample: Option<&str>,
) -> ParseResult<(Vec<String>, usize)> {
    let columns: Vec<&str> = line.split('\t').collect();
    let malformed = |reason: String| ParseError::MalformedHeader {
        line: line_no,
        reason,
    };

    if columns.len() < FIXED_COLUMNS.len()
        || columns[..FIXED_COLUMNS.len()] != FIXED_COLUMNS[..]
    {
        return Err(malformed(format!(
            "column header must start with {}",
            FIXED_COLUMNS.join(" ")
        )));
    }

    match columns.get(FIXED_COLUMNS.len()) {
        None => {
            return Err(malformed(
                "no genotype column: FORMAT and at least one sample column are required"
                    .to_string(),
            ));
        }
        Some(&col) if col != FORMAT_COLUMN => {
            return Err(malformed(format!(
                "expected FORMAT as column 9, found '{}'",
                col
            )));
        }
        Some(_) => {}
    }

    let samples: Vec<String> = columns[FIXED_COLUMNS.len() + 1..]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if samples.is_empty() {
        return Err(malformed(
            "no genotype column: at least one sample column is required".to_string(),
        ));
    }
    if let Some(empty) = samples.iter().position(|s| s.trim().is_empty()) {
        return Err(malformed(format!("sample column {} has no name", empty + 10)));
    }

    let sample_index = match wanted_sample {
        Some(name) => samples.iter().position(|s| s == name).ok_or_else(|| {
            malformed(format!("sample '{}' is not present in the header", name))
        })?,
        None => 0,
    };

    Ok((samples, sample_index))
}
