//! Parser integration tests against the shared fixture files.

use std::io::Write;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use pgxguard_core::RunControl;
use pgxguard_core::models::Diagnostic;
use pgxguard_vcf::{ParseError, ParseOptions, parse_vcf_file};
use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::tempdir;

#[fixture]
fn path_to_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tests/data/vcf")
}

#[rstest]
fn test_parse_fixture_keeps_line_order(path_to_data: PathBuf) {
    let parsed = parse_vcf_file(
        &path_to_data.join("cyp2d6_pm.vcf"),
        &ParseOptions::default(),
        &RunControl::unbounded(),
    )
    .unwrap();

    assert_eq!(parsed.header.version, "VCFv4.2");
    assert_eq!(parsed.header.sample_name(), "PATIENT_001");
    assert_eq!(parsed.records.len(), 8);
    assert!(parsed.diagnostics.is_empty());

    let lines: Vec<usize> = parsed.records.iter().map(|r| r.line).collect();
    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);

    let first = &parsed.records[0];
    assert_eq!(first.normalized_chrom(), "22");
    assert_eq!(first.pos, 42130692);
    assert!(first.has_id("rs1065852"));
    assert_eq!(first.genotype.to_string(), "1/1");
    assert_eq!(first.depth, Some(45));
    assert_eq!(first.info.get("GENE").map(String::as_str), Some("CYP2D6"));
}

#[rstest]
fn test_parse_fixture_reports_malformed_lines(path_to_data: PathBuf) {
    let parsed = parse_vcf_file(
        &path_to_data.join("malformed_lines.vcf"),
        &ParseOptions::default(),
        &RunControl::unbounded(),
    )
    .unwrap();

    let kept: Vec<usize> = parsed.records.iter().map(|r| r.line).collect();
    assert_eq!(kept, vec![9, 12, 14]);

    let skipped: Vec<usize> = parsed
        .diagnostics
        .iter()
        .map(|d| match d {
            Diagnostic::MalformedLine { line, .. } => *line,
            other => panic!("unexpected diagnostic {:?}", other),
        })
        .collect();
    assert_eq!(skipped, vec![10, 11, 13]);
}

#[rstest]
fn test_parse_fixture_pass_filter(path_to_data: PathBuf) {
    let options = ParseOptions {
        require_pass_filter: true,
        ..ParseOptions::default()
    };
    let parsed = parse_vcf_file(
        &path_to_data.join("malformed_lines.vcf"),
        &options,
        &RunControl::unbounded(),
    )
    .unwrap();

    assert_eq!(parsed.records.len(), 2);
    assert!(parsed.diagnostics.contains(&Diagnostic::FilteredRecord {
        line: 14,
        filter: "q10".to_string()
    }));
}

#[rstest]
fn test_parse_gzipped_file(path_to_data: PathBuf) {
    let plain = std::fs::read(path_to_data.join("cyp2d6_pm.vcf")).unwrap();

    let dir = tempdir().unwrap();
    let gz_path = dir.path().join("cyp2d6_pm.vcf.gz");
    let file = std::fs::File::create(&gz_path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&plain).unwrap();
    encoder.finish().unwrap();

    let parsed =
        parse_vcf_file(&gz_path, &ParseOptions::default(), &RunControl::unbounded()).unwrap();
    assert_eq!(parsed.records.len(), 8);
}

#[rstest]
fn test_gzipped_file_over_ceiling_once_decompressed(path_to_data: PathBuf) {
    let plain = std::fs::read(path_to_data.join("cyp2d6_pm.vcf")).unwrap();
    let padding = "##comment=padding\n".repeat(20_000);
    let limit = 64 * 1024;

    let dir = tempdir().unwrap();
    let gz_path = dir.path().join("padded.vcf.gz");
    let file = std::fs::File::create(&gz_path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::best());
    encoder.write_all(padding.as_bytes()).unwrap();
    encoder.write_all(&plain).unwrap();
    encoder.finish().unwrap();

    // compressed size is far under the ceiling, decompressed size far over it
    assert!(std::fs::metadata(&gz_path).unwrap().len() < limit as u64);
    assert!(padding.len() + plain.len() > limit);

    let options = ParseOptions {
        max_bytes: limit,
        ..ParseOptions::default()
    };
    let result = parse_vcf_file(&gz_path, &options, &RunControl::unbounded());
    assert!(matches!(result, Err(ParseError::SizeExceeded { limit: l }) if l == limit));
}

#[rstest]
fn test_parse_file_over_ceiling(path_to_data: PathBuf) {
    let options = ParseOptions {
        max_bytes: 64,
        ..ParseOptions::default()
    };
    let result = parse_vcf_file(
        &path_to_data.join("cyp2d6_pm.vcf"),
        &options,
        &RunControl::unbounded(),
    );
    assert!(matches!(result, Err(ParseError::SizeExceeded { limit: 64 })));
}

#[rstest]
fn test_parse_missing_file() {
    let result = parse_vcf_file(
        &PathBuf::from("does/not/exist.vcf"),
        &ParseOptions::default(),
        &RunControl::unbounded(),
    );
    assert!(matches!(result, Err(ParseError::Io(_))));
}
