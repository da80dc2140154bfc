//! # Variant record parser
//!
//! Parses VCF-style text into [`VariantRecord`](pgxguard_core::models::VariantRecord)s
//! for a single sample. The parser is strict about the header and lenient about
//! data lines:
//!
//! - input over the size ceiling, an unsupported `##fileformat` version, or a
//!   header from which no genotype column can be established are fatal
//!   ([`ParseError`])
//! - any malformed data line is skipped and reported as a
//!   [`Diagnostic::MalformedLine`](pgxguard_core::models::Diagnostic)
//!
//! Records come back in input line order.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pgxguard_core::RunControl;
//! use pgxguard_vcf::{ParseOptions, parse_vcf_file};
//!
//! let options = ParseOptions::default();
//! let control = RunControl::unbounded();
//! let parsed = parse_vcf_file(Path::new("sample.vcf"), &options, &control).unwrap();
//! println!("{} records, {} diagnostics", parsed.records.len(), parsed.diagnostics.len());
//! ```

pub mod error;
pub mod header;
pub mod io;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use header::VcfHeader;
pub use parser::{
    MAX_INPUT_BYTES, ParseOptions, ParsedVcf, SUPPORTED_VERSIONS, parse_vcf, parse_vcf_bytes,
    parse_vcf_file,
};
