use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use pgxguard_core::RunControl;
use pgxguard_core::models::{Diagnostic, Genotype, VariantRecord};

use crate::error::{ParseError, ParseResult};
use crate::header::{VcfHeader, check_version, parse_column_header};
use crate::io::{get_dynamic_reader, read_bounded};

/// 5 MiB input ceiling
pub const MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

pub const SUPPORTED_VERSIONS: [&str; 4] = ["VCFv4.0", "VCFv4.1", "VCFv4.2", "VCFv4.3"];

const FILEFORMAT_PREFIX: &str = "##fileformat=";

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub max_bytes: usize,
    /// Version tag declared by the caller; the file must declare the same one
    pub expected_version: Option<String>,
    pub supported_versions: Vec<String>,
    /// Sample column to read; the first sample when unset
    pub sample: Option<String>,
    /// Skip records whose FILTER is neither `PASS` nor `.`
    pub require_pass_filter: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_bytes: MAX_INPUT_BYTES,
            expected_version: None,
            supported_versions: SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
            sample: None,
            require_pass_filter: false,
        }
    }
}

///
/// Output of a successful parse: records in input order plus the
/// diagnostics for every skipped line.
///
#[derive(Debug, Clone)]
pub struct ParsedVcf {
    pub header: VcfHeader,
    pub records: Vec<VariantRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

///
/// Parse a file from disk, gzip'd or plain.
///
pub fn parse_vcf_file(
    path: &Path,
    options: &ParseOptions,
    control: &RunControl,
) -> ParseResult<ParsedVcf> {
    let reader = get_dynamic_reader(path, options.max_bytes)?;
    parse_vcf(reader, options, control)
}

///
/// Parse from any reader. At most `max_bytes + 1` bytes are pulled from it.
///
pub fn parse_vcf<R: std::io::Read>(
    reader: R,
    options: &ParseOptions,
    control: &RunControl,
) -> ParseResult<ParsedVcf> {
    let bytes = read_bounded(reader, options.max_bytes)?;
    parse_vcf_bytes(&bytes, options, control)
}

///
/// Parse an in-memory file.
///
/// # Arguments
/// - bytes: full file content
/// - options: size ceiling, accepted versions, sample selection
/// - control: checked once per line
///
pub fn parse_vcf_bytes(
    bytes: &[u8],
    options: &ParseOptions,
    control: &RunControl,
) -> ParseResult<ParsedVcf> {
    if bytes.len() > options.max_bytes {
        return Err(ParseError::SizeExceeded {
            limit: options.max_bytes,
        });
    }

    let mut lines = bytes
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(i, raw)| (i + 1, raw.strip_suffix(b"\r".as_slice()).unwrap_or(raw)));

    let header = read_header(&mut lines, options, control)?;
    debug!(
        "Header: {} with {} sample(s), reading '{}'",
        header.version,
        header.samples.len(),
        header.sample_name()
    );

    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    for (line_no, raw) in lines {
        control.check()?;
        if raw.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }

        match parse_record(raw, line_no, &header) {
            Ok(record) => {
                if options.require_pass_filter && !record.passed_filters() {
                    diagnostics.push(Diagnostic::FilteredRecord {
                        line: line_no,
                        filter: record.filter.clone().unwrap_or_default(),
                    });
                    continue;
                }
                records.push(record);
            }
            Err(reason) => diagnostics.push(Diagnostic::MalformedLine {
                line: line_no,
                reason,
            }),
        }
    }

    if !diagnostics.is_empty() {
        warn!(
            "{} data line(s) skipped, {} record(s) kept",
            diagnostics.len(),
            records.len()
        );
    }

    Ok(ParsedVcf {
        header,
        records,
        diagnostics,
    })
}

fn read_header<'a, I>(
    lines: &mut I,
    options: &ParseOptions,
    control: &RunControl,
) -> ParseResult<VcfHeader>
where
    I: Iterator<Item = (usize, &'a [u8])>,
{
    let mut version: Option<String> = None;
    let mut meta = Vec::new();
    let mut last_line = 1;

    for (line_no, raw) in lines {
        control.check()?;
        last_line = line_no;

        let line = std::str::from_utf8(raw).map_err(|_| ParseError::MalformedHeader {
            line: line_no,
            reason: "header line is not valid UTF-8".to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        if version.is_none() {
            let declared = line.strip_prefix(FILEFORMAT_PREFIX).ok_or_else(|| {
                ParseError::MalformedHeader {
                    line: line_no,
                    reason: "header is absent: first line must be a ##fileformat declaration"
                        .to_string(),
                }
            })?;
            let declared = declared.trim();
            check_version(
                declared,
                line_no,
                &options.supported_versions,
                options.expected_version.as_deref(),
            )?;
            version = Some(declared.to_string());
            continue;
        }

        if let Some(entry) = line.strip_prefix("##") {
            let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
            meta.push((key.to_string(), value.to_string()));
            continue;
        }

        if line.starts_with("#CHROM") {
            let (samples, sample_index) =
                parse_column_header(line, line_no, options.sample.as_deref())?;
            return Ok(VcfHeader {
                // set above: the first non-blank line either declares it or errors
                version: version.unwrap_or_default(),
                meta,
                samples,
                sample_index,
            });
        }

        return Err(ParseError::MalformedHeader {
            line: line_no,
            reason: "expected ## metadata or the #CHROM column header".to_string(),
        });
    }

    let reason = match version {
        None => "header is absent: input has no ##fileformat declaration",
        Some(_) => "missing #CHROM column header",
    };
    Err(ParseError::MalformedHeader {
        line: last_line,
        reason: reason.to_string(),
    })
}

///
/// Parse one data line. The error is the human-readable reason the line was
/// rejected.
///
fn parse_record(raw: &[u8], line_no: usize, header: &VcfHeader) -> Result<VariantRecord, String> {
    let line = std::str::from_utf8(raw).map_err(|_| "line is not valid UTF-8".to_string())?;
    if line.starts_with('#') {
        return Err("header line after the #CHROM column header".to_string());
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != header.column_count() {
        return Err(format!(
            "expected {} tab-separated columns, found {}",
            header.column_count(),
            fields.len()
        ));
    }

    let chrom = fields[0];
    if chrom.is_empty() || chrom.contains(char::is_whitespace) {
        return Err("CHROM must be a non-empty name without spaces".to_string());
    }

    let pos = match fields[1].parse::<u64>() {
        Ok(p) if p > 0 => p,
        _ => {
            return Err(format!(
                "POS must be a positive integer, found '{}'",
                fields[1]
            ));
        }
    };

    let ids: Vec<String> = match fields[2] {
        "." => Vec::new(),
        s => s.split(';').map(|id| id.to_string()).collect(),
    };

    let reference = fields[3];
    check_bases(reference, "REF")?;

    let alternates: Vec<String> = match fields[4] {
        "." => Vec::new(),
        s => {
            let mut alts = Vec::new();
            for alt in s.split(',') {
                check_bases(alt, "ALT")?;
                alts.push(alt.to_string());
            }
            alts
        }
    };

    let quality = match fields[5] {
        "." => None,
        s => match s.parse::<f64>() {
            Ok(q) if q.is_finite() && q >= 0.0 => Some(q),
            _ => return Err(format!("QUAL must be '.' or a non-negative number, found '{}'", s)),
        },
    };

    let filter = match fields[6] {
        "." => None,
        s => Some(s.to_string()),
    };

    let info = parse_info(fields[7]);

    let format_keys: Vec<&str> = fields[8].split(':').collect();
    let gt_index = format_keys
        .iter()
        .position(|k| *k == "GT")
        .ok_or_else(|| "FORMAT has no GT key".to_string())?;
    let sample_values: Vec<&str> = fields[9 + header.sample_index].split(':').collect();
    let gt = sample_values
        .get(gt_index)
        .ok_or_else(|| "sample column has no GT value".to_string())?;

    let genotype = parse_genotype(gt, 1 + alternates.len())?;

    let depth = match format_keys.iter().position(|k| *k == "DP") {
        Some(i) => match sample_values.get(i) {
            Some(v) => parse_depth(v, "FORMAT")?,
            None => None,
        },
        None => None,
    };
    let depth = match depth {
        Some(d) => Some(d),
        None => match info.get("DP") {
            Some(v) => parse_depth(v, "INFO")?,
            None => None,
        },
    };

    Ok(VariantRecord {
        line: line_no,
        chrom: chrom.to_string(),
        pos,
        ids,
        reference: reference.to_string(),
        alternates,
        genotype,
        quality,
        filter,
        info,
        depth,
    })
}

fn check_bases(allele: &str, column: &str) -> Result<(), String> {
    if allele.is_empty() {
        return Err(format!("{} allele is empty", column));
    }
    if !allele
        .bytes()
        .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
    {
        return Err(format!(
            "{} allele '{}' has symbols other than A, C, G, T, N",
            column, allele
        ));
    }
    Ok(())
}

/// `KEY=VALUE;FLAG;...`; flags map to an empty value.
fn parse_info(field: &str) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    if field == "." {
        return info;
    }
    for entry in field.split(';').filter(|e| !e.is_empty()) {
        let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
        info.insert(key.to_string(), value.to_string());
    }
    info
}

fn parse_depth(value: &str, source: &str) -> Result<Option<u32>, String> {
    match value {
        "." | "" => Ok(None),
        v => v
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("{} DP must be a non-negative integer, found '{}'", source, v)),
    }
}

///
/// Parse a GT value of ploidy 1 or 2 into zero-based allele indices.
///
fn parse_genotype(gt: &str, allele_count: usize) -> Result<Genotype, String> {
    let phased = gt.contains('|');
    if phased && gt.contains('/') {
        return Err(format!("GT '{}' mixes phased and unphased separators", gt));
    }

    let parts: Vec<&str> = gt.split(|c| c == '/' || c == '|').collect();
    if parts.len() > 2 {
        return Err(format!("GT '{}' has ploidy above 2", gt));
    }

    let mut alleles = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            "." => alleles.push(None),
            p => {
                let index = p
                    .parse::<usize>()
                    .map_err(|_| format!("GT '{}' has a non-numeric allele index", gt))?;
                if index >= allele_count {
                    return Err(format!(
                        "GT allele index {} refers past the {} declared allele(s)",
                        index, allele_count
                    ));
                }
                alleles.push(Some(index));
            }
        }
    }

    Ok(Genotype { alleles, phased })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const HEADER: &str = concat!(
        "##fileformat=VCFv4.2\n##source=test\n",
        "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1\n",
    );

    fn parse(body: &str) -> ParseResult<ParsedVcf> {
        let text = format!("{}{}", HEADER, body);
        parse_vcf_bytes(text.as_bytes(), &ParseOptions::default(), &RunControl::unbounded())
    }

    fn malformed_reason(body: &str) -> String {
        let parsed = parse(body).unwrap();
        assert_eq!(parsed.records.len(), 0);
        match &parsed.diagnostics[0] {
            Diagnostic::MalformedLine { reason, .. } => reason.clone(),
            other => panic!("unexpected diagnostic {:?}", other),
        }
    }

    #[rstest]
    fn test_parse_single_record() {
        let parsed = parse(
            "22\t42128945\trs3892097\tC\tT\t99.5\tPASS\tGENE=CYP2D6;DB\tGT:DP\t0/1:35\n",
        )
        .unwrap();

        assert_eq!(parsed.header.version, "VCFv4.2");
        assert_eq!(parsed.header.meta_value("source"), Some("test"));
        assert_eq!(parsed.records.len(), 1);

        let record = &parsed.records[0];
        assert_eq!(record.line, 4);
        assert_eq!(record.pos, 42128945);
        assert_eq!(record.ids, vec!["rs3892097".to_string()]);
        assert_eq!(record.alternates, vec!["T".to_string()]);
        assert_eq!(record.genotype.alleles, vec![Some(0), Some(1)]);
        assert_eq!(record.quality, Some(99.5));
        assert_eq!(record.depth, Some(35));
        assert_eq!(record.info.get("GENE").map(String::as_str), Some("CYP2D6"));
        assert_eq!(record.info.get("DB").map(String::as_str), Some(""));
    }

    #[rstest]
    fn test_info_depth_used_when_format_has_none() {
        let parsed = parse("1\t100\t.\tA\tG\t.\t.\tDP=12\tGT\t1|0\n").unwrap();
        let record = &parsed.records[0];
        assert_eq!(record.depth, Some(12));
        assert!(record.genotype.phased);
        assert_eq!(record.quality, None);
        assert_eq!(record.filter, None);
    }

    #[rstest]
    #[case("22\t0\t.\tC\tT\t.\tPASS\t.\tGT\t0/1", "POS must be a positive integer")]
    #[case("22\t-5\t.\tC\tT\t.\tPASS\t.\tGT\t0/1", "POS must be a positive integer")]
    #[case("22\t12\t.\tC\t<DEL>\t.\tPASS\t.\tGT\t0/1", "ALT allele '<DEL>'")]
    #[case("22\t12\t.\tX\tT\t.\tPASS\t.\tGT\t0/1", "REF allele 'X'")]
    #[case("22\t12\t.\tC\tT\t.\tPASS\t.\tGT\t0/2", "GT allele index 2")]
    #[case("22\t12\t.\tC\tT\t.\tPASS\t.\tGT\t0/1/1", "ploidy above 2")]
    #[case("22\t12\t.\tC\tT\t.\tPASS\t.\tDP\t12", "FORMAT has no GT key")]
    #[case("22\t12\t.\tC\tT\tlow\tPASS\t.\tGT\t0/1", "QUAL must be")]
    #[case("22\t12\t.\tC\tT\t.\tPASS", "expected 10 tab-separated columns")]
    fn test_malformed_lines(#[case] body: &str, #[case] expected: &str) {
        let reason = malformed_reason(&format!("{}\n", body));
        assert!(
            reason.contains(expected),
            "reason '{}' should contain '{}'",
            reason,
            expected
        );
    }

    #[rstest]
    fn test_malformed_line_does_not_abort() {
        let parsed = parse(concat!(
            "22\t100\t.\tC\tT\t.\tPASS\t.\tGT\t0/1\n",
            "22\tabc\t.\tC\tT\t.\tPASS\t.\tGT\t0/1\n",
            "22\t300\t.\tG\tA\t.\tPASS\t.\tGT\t1/1\n",
        ))
        .unwrap();

        let positions: Vec<u64> = parsed.records.iter().map(|r| r.pos).collect();
        assert_eq!(positions, vec![100, 300]);
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::MalformedLine {
                line: 5,
                reason: "POS must be a positive integer, found 'abc'".to_string()
            }]
        );
    }

    #[rstest]
    fn test_missing_fileformat_is_fatal() {
        let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS\n";
        let err = parse_vcf_bytes(
            text.as_bytes(),
            &ParseOptions::default(),
            &RunControl::unbounded(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { line: 1, .. }));
    }

    #[rstest]
    fn test_empty_input_is_fatal() {
        let err = parse_vcf_bytes(b"", &ParseOptions::default(), &RunControl::unbounded())
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));
    }

    #[rstest]
    fn test_missing_column_header_is_fatal() {
        let text = "##fileformat=VCFv4.2\n##source=test\n";
        let err = parse_vcf_bytes(
            text.as_bytes(),
            &ParseOptions::default(),
            &RunControl::unbounded(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("#CHROM"));
    }

    #[rstest]
    fn test_unsupported_version() {
        let text = "##fileformat=VCFv3.3\n";
        let err = parse_vcf_bytes(
            text.as_bytes(),
            &ParseOptions::default(),
            &RunControl::unbounded(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion { line: 1, .. }));
    }

    #[rstest]
    fn test_expected_version_mismatch() {
        let options = ParseOptions {
            expected_version: Some("VCFv4.3".to_string()),
            ..ParseOptions::default()
        };
        let err = parse_vcf_bytes(HEADER.as_bytes(), &options, &RunControl::unbounded())
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion { .. }));
    }

    #[rstest]
    fn test_size_ceiling_checked_before_parsing() {
        let options = ParseOptions {
            max_bytes: 10,
            ..ParseOptions::default()
        };
        let err = parse_vcf_bytes(HEADER.as_bytes(), &options, &RunControl::unbounded())
            .unwrap_err();
        assert!(matches!(err, ParseError::SizeExceeded { limit: 10 }));
    }

    #[rstest]
    fn test_require_pass_filter() {
        let text = format!("{}22\t100\t.\tC\tT\t.\tLowQual\t.\tGT\t0/1\n", HEADER);
        let options = ParseOptions {
            require_pass_filter: true,
            ..ParseOptions::default()
        };
        let parsed = parse_vcf_bytes(text.as_bytes(), &options, &RunControl::unbounded()).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::FilteredRecord {
                line: 4,
                filter: "LowQual".to_string()
            }]
        );
    }

    #[rstest]
    fn test_crlf_line_endings() {
        let text = HEADER.replace('\n', "\r\n") + "22\t100\t.\tC\tT\t.\tPASS\t.\tGT\t0/1\r\n";
        let parsed =
            parse_vcf_bytes(text.as_bytes(), &ParseOptions::default(), &RunControl::unbounded())
                .unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.diagnostics.is_empty());
    }

    #[rstest]
    fn test_interrupted_run_stops() {
        let control = RunControl::unbounded().with_timeout(std::time::Duration::ZERO);
        let err = parse_vcf_bytes(HEADER.as_bytes(), &ParseOptions::default(), &control)
            .unwrap_err();
        assert!(matches!(err, ParseError::Interrupted(_)));
    }
}
