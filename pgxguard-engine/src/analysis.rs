//! End-to-end analysis of one variant file against one drug request.

use std::collections::HashSet;
use std::str::FromStr;

use log::{debug, info, warn};
use pgxguard_core::RunControl;
use pgxguard_core::models::{
    Diagnostic, Diplotype, Drug, Gene, InteractionWarning, PhenotypeCall, RiskClassification,
    VariantRecord,
};
use pgxguard_vcf::parse_vcf_bytes;
use serde::Serialize;

use crate::aggregator::{classify_drug, scan_interactions};
use crate::classifier::classify;
use crate::context::AnalysisContext;
use crate::errors::AnalysisError;
use crate::loci::VKORC1_WARFARIN_SITE;
use crate::resolver::resolve_all;
use crate::rules::match_drug;

///
/// Input of one run: file content, the version tag the caller declared, and
/// the drug names to classify.
///
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub content: &'a [u8],
    pub version: Option<String>,
    pub drugs: Vec<String>,
    /// Sample column to analyze; the first sample when unset
    pub sample: Option<String>,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(content: &'a [u8], drugs: Vec<String>) -> Self {
        AnalysisRequest {
            content,
            version: None,
            drugs,
            sample: None,
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_sample(mut self, sample: &str) -> Self {
        self.sample = Some(sample.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneReport {
    pub diplotype: Diplotype,
    pub phenotype: PhenotypeCall,
}

///
/// Everything a run produces. Classifications follow request order; genes
/// follow the locus index order.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub sample: String,
    pub format_version: String,
    pub records_parsed: usize,
    pub genes: Vec<GeneReport>,
    pub classifications: Vec<RiskClassification>,
    pub interactions: Vec<InteractionWarning>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn gene(&self, gene: Gene) -> Option<&GeneReport> {
        self.genes.iter().find(|g| g.diplotype.gene == gene)
    }

    /// Case-insensitive lookup by drug name.
    pub fn classification(&self, drug: &str) -> Option<&RiskClassification> {
        self.classifications
            .iter()
            .find(|c| c.drug.eq_ignore_ascii_case(drug))
    }
}

#[derive(Debug)]
enum RequestedDrug {
    Known(Drug),
    Unrecognized(String),
}

///
/// Validate the requested names against the catalog. Duplicates (after case
/// folding) are dropped with a diagnostic.
///
fn resolve_drug_names(
    names: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<RequestedDrug>, AnalysisError> {
    if names.is_empty() {
        return Err(AnalysisError::NoDrugsRequested);
    }

    let mut requested = Vec::with_capacity(names.len());
    let mut seen_known: HashSet<Drug> = HashSet::new();
    let mut seen_unknown: HashSet<String> = HashSet::new();

    for name in names {
        let name = name.trim();
        match Drug::from_str(name) {
            Ok(drug) => {
                if seen_known.insert(drug) {
                    requested.push(RequestedDrug::Known(drug));
                } else {
                    diagnostics.push(Diagnostic::DuplicateDrug {
                        name: name.to_string(),
                    });
                }
            }
            Err(_) => {
                if seen_unknown.insert(name.to_lowercase()) {
                    warn!("Requested drug '{}' is not in the catalog", name);
                    diagnostics.push(Diagnostic::UnrecognizedDrug {
                        name: name.to_string(),
                    });
                    requested.push(RequestedDrug::Unrecognized(name.to_string()));
                } else {
                    diagnostics.push(Diagnostic::DuplicateDrug {
                        name: name.to_string(),
                    });
                }
            }
        }
    }

    if seen_known.is_empty() {
        return Err(AnalysisError::NoRecognizedDrugs {
            requested: names.to_vec(),
        });
    }
    Ok(requested)
}

///
/// First record carrying the VKORC1 warfarin sensitivity allele on any copy.
///
fn warfarin_sensitivity(records: &[VariantRecord]) -> Option<Diagnostic> {
    let site = &VKORC1_WARFARIN_SITE;
    records.iter().filter(|r| site.covers(r)).find_map(|record| {
        let carried = record
            .genotype
            .alleles
            .iter()
            .flatten()
            .filter(|k| **k > 0)
            .any(|k| {
                record
                    .allele(*k)
                    .is_some_and(|alt| site.matches(&record.reference, alt))
            });
        carried.then(|| Diagnostic::WarfarinSensitivity {
            line: record.line,
            rsid: site.rsid.to_string(),
            genotype: record.genotype.to_string(),
        })
    })
}

///
/// Run the whole pipeline for one request.
///
/// Fatal errors are limited to the parser's (size, version, header), a drug
/// list with no catalog drug in it, and interruption. Everything else
/// degrades to lower confidence or `Unknown` and is reported in
/// `diagnostics`.
///
/// # Arguments
/// - ctx: shared tables and config
/// - request: content, declared version and drug names
/// - control: checked between records, genes and drugs
///
pub fn analyze(
    ctx: &AnalysisContext,
    request: &AnalysisRequest,
    control: &RunControl,
) -> Result<AnalysisReport, AnalysisError> {
    let mut diagnostics = Vec::new();
    let requested = resolve_drug_names(&request.drugs, &mut diagnostics)?;

    let options = ctx
        .config()
        .parse_options(request.version.as_deref(), request.sample.as_deref());
    let parsed = parse_vcf_bytes(request.content, &options, control)?;
    diagnostics.extend(parsed.diagnostics);

    let warfarin_requested = requested
        .iter()
        .any(|r| matches!(r, RequestedDrug::Known(Drug::Warfarin)));
    if warfarin_requested {
        if let Some(found) = warfarin_sensitivity(&parsed.records) {
            debug!("{}", found);
            diagnostics.push(found);
        }
    }

    let resolutions = resolve_all(ctx.index(), &parsed.records, ctx.config(), control)?;

    let mut diplotypes = Vec::with_capacity(resolutions.len());
    let mut calls = Vec::with_capacity(resolutions.len());
    for (locus, resolution) in ctx.index().loci().iter().zip(resolutions) {
        calls.push(classify(locus, &resolution.diplotype));
        diplotypes.push(resolution.diplotype);
        diagnostics.extend(resolution.diagnostics);
    }

    let mut per_drug = Vec::new();
    for drug in &requested {
        control.check()?;
        if let RequestedDrug::Known(drug) = drug {
            per_drug.push((*drug, match_drug(ctx.guidelines(), ctx.index(), &calls, *drug)));
        }
    }

    let classifications: Vec<RiskClassification> = requested
        .iter()
        .map(|requested| match requested {
            RequestedDrug::Known(drug) => per_drug
                .iter()
                .find(|(d, _)| d == drug)
                .map(|(_, matches)| classify_drug(*drug, matches, &diplotypes))
                .unwrap_or_else(|| RiskClassification::unknown(drug.name())),
            RequestedDrug::Unrecognized(name) => RiskClassification::unknown(name),
        })
        .collect();

    let interactions = scan_interactions(&per_drug, ctx.index());

    let genes = diplotypes
        .iter()
        .cloned()
        .zip(calls.iter().cloned())
        .map(|(diplotype, phenotype)| GeneReport {
            diplotype,
            phenotype,
        })
        .collect();

    let report = AnalysisReport {
        sample: parsed.header.sample_name().to_string(),
        format_version: parsed.header.version.clone(),
        records_parsed: parsed.records.len(),
        genes,
        classifications,
        interactions,
        diagnostics,
    };

    info!(
        "Analyzed '{}': {} classification(s), {} interaction warning(s), {} diagnostic(s)",
        report.sample,
        report.classifications.len(),
        report.interactions.len(),
        report.diagnostics.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use pgxguard_core::models::Genotype;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn names(drugs: &[&str]) -> Vec<String> {
        drugs.iter().map(|d| d.to_string()).collect()
    }

    #[rstest]
    fn test_drug_names_case_insensitive_and_deduplicated() {
        let mut diagnostics = Vec::new();
        let requested = resolve_drug_names(
            &names(&["codeine", " WARFARIN ", "Codeine"]),
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(requested.len(), 2);
        assert!(matches!(requested[0], RequestedDrug::Known(Drug::Codeine)));
        assert!(matches!(requested[1], RequestedDrug::Known(Drug::Warfarin)));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DuplicateDrug {
                name: "Codeine".to_string()
            }]
        );
    }

    #[rstest]
    fn test_unrecognized_drug_kept_as_unknown() {
        let mut diagnostics = Vec::new();
        let requested =
            resolve_drug_names(&names(&["Codeine", "Ibuprofen"]), &mut diagnostics).unwrap();
        assert_eq!(requested.len(), 2);
        assert!(matches!(&requested[1], RequestedDrug::Unrecognized(n) if n == "Ibuprofen"));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnrecognizedDrug {
                name: "Ibuprofen".to_string()
            }]
        );
    }

    #[rstest]
    fn test_no_recognized_drug_is_fatal() {
        let mut diagnostics = Vec::new();
        let result = resolve_drug_names(&names(&["Aspirin", "Ibuprofen"]), &mut diagnostics);
        assert!(matches!(
            result,
            Err(AnalysisError::NoRecognizedDrugs { requested }) if requested.len() == 2
        ));
    }

    fn record(
        chrom: &str,
        pos: u64,
        id: &str,
        reference: &str,
        alt: &str,
        gt: &str,
    ) -> VariantRecord {
        let phased = gt.contains('|');
        VariantRecord {
            line: 9,
            chrom: chrom.to_string(),
            pos,
            ids: vec![id.to_string()],
            reference: reference.to_string(),
            alternates: vec![alt.to_string()],
            genotype: Genotype {
                alleles: gt.split(['/', '|']).map(|a| a.parse().ok()).collect(),
                phased,
            },
            quality: Some(99.0),
            filter: None,
            info: BTreeMap::new(),
            depth: None,
        }
    }

    #[rstest]
    #[case(record("chr16", 31096368, "rs9923231", "C", "T", "0/1"), true)]
    #[case(record("16", 31096368, ".", "C", "T", "1|1"), true)]
    #[case(record("16", 1, "rs9923231", "C", "T", "0/1"), true)]
    #[case(record("16", 31096368, "rs9923231", "C", "T", "0/0"), false)]
    #[case(record("16", 31096368, "rs9923231", "C", "G", "0/1"), false)]
    #[case(record("16", 31096369, "rs1", "C", "T", "1/1"), false)]
    fn test_warfarin_sensitivity_site(#[case] rec: VariantRecord, #[case] carried: bool) {
        let found = warfarin_sensitivity(&[rec]);
        assert_eq!(found.is_some(), carried);
    }

    #[rstest]
    fn test_empty_request_is_fatal() {
        let mut diagnostics = Vec::new();
        let result = resolve_drug_names(&[], &mut diagnostics);
        assert!(matches!(result, Err(AnalysisError::NoDrugsRequested)));
    }
}
