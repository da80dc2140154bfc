//! Diplotype resolution: from the variant records covering a gene to a pair
//! of star-allele calls with a resolution confidence.
//!
//! Each chromosomal copy is called on its own. Unphased heterozygous
//! alternates go on the second copy, so unphased alternates of a gene start
//! out in cis. For a copy, every allele whose defining variants were all
//! observed is satisfied; satisfied alleles nested inside a larger satisfied
//! one drop out. What remains decides the call:
//!
//! | remaining | call | confidence |
//! |-----------|------|------------|
//! | none | reference allele | `Confirmed` |
//! | one | that allele | `Confirmed` |
//! | several | highest-priority allele | `Ambiguous` |
//!
//! Observed alternates that no remaining allele explains, and no-call slots,
//! lower a `Confirmed` copy to `Inferred`. The diplotype takes the weaker of
//! the two copy confidences.
//!
//! When a copy has several remaining alleles with no defining variant in
//! common, the runner-up was placed only by unphased heterozygous calls, and
//! the other copy carries nothing but reference, the runner-up moves to the
//! other copy (trans). Both copies are then called, and the diplotype stays
//! `Ambiguous` because the phase was never observed.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use pgxguard_core::models::{Diagnostic, Diplotype, Gene, ResolutionConfidence, VariantRecord};
use pgxguard_core::{Interrupted, RunControl};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::loci::{AlleleDefinition, GeneLocus, LocusIndex};
use crate::quality::call_quality;

/// Diplotype of one gene together with what was noticed while calling it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneResolution {
    pub diplotype: Diplotype,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
struct CopyObservation {
    observed: BTreeSet<usize>,
    // signatures placed by an unphased heterozygous call
    unphased: BTreeSet<usize>,
    unexplained: Vec<String>,
    missing: bool,
}

#[derive(Debug)]
struct CopyCall<'a> {
    allele: &'a AlleleDefinition,
    confidence: ResolutionConfidence,
}

///
/// Resolve every gene of the index against one sample's records.
///
/// Genes come back in index order. The run control is checked once per
/// record and once per gene.
///
pub fn resolve_all(
    index: &LocusIndex,
    records: &[VariantRecord],
    config: &PipelineConfig,
    control: &RunControl,
) -> Result<Vec<GeneResolution>, Interrupted> {
    let mut by_gene: HashMap<Gene, Vec<&VariantRecord>> = HashMap::new();
    for record in records {
        control.check()?;
        for locus in index.lookup(record) {
            by_gene.entry(locus.gene).or_default().push(record);
        }
    }

    let mut resolutions = Vec::with_capacity(index.loci().len());
    for locus in index.loci() {
        control.check()?;
        let covering = by_gene.remove(&locus.gene).unwrap_or_default();
        resolutions.push(resolve_gene(locus, &covering, config));
    }
    Ok(resolutions)
}

///
/// Resolve one gene from the records covering its defining positions.
///
/// # Arguments
/// - locus: allele table of the gene
/// - records: records whose position or rsID hit a defining site, in input order
/// - config: call-quality bounds
///
pub fn resolve_gene(
    locus: &GeneLocus,
    records: &[&VariantRecord],
    config: &PipelineConfig,
) -> GeneResolution {
    let gene = locus.gene;
    let mut diagnostics = Vec::new();

    if records.is_empty() {
        debug!("{}: no covering records", gene);
        diagnostics.push(Diagnostic::GeneNotCovered { gene });
        return GeneResolution {
            diplotype: reference_pair(locus, ResolutionConfidence::NoCall, 0, None),
            diagnostics,
        };
    }

    let quality = call_quality(records.iter().copied(), config);

    let mut copies: [CopyObservation; 2] = Default::default();
    let mut called_records = 0;

    for record in records {
        if record.genotype.is_no_call() || record.genotype.alleles.contains(&None) {
            diagnostics.push(Diagnostic::NoCallGenotype {
                line: record.line,
                gene,
            });
        }
        if record.genotype.is_no_call() {
            continue;
        }
        called_records += 1;

        let covered = locus.signatures_covered_by(record);
        let slots = record.genotype.copies();
        let unphased_het = !record.genotype.phased && slots[0] != slots[1];
        for (copy, slot) in slots.iter().enumerate() {
            match slot {
                None => copies[copy].missing = true,
                Some(0) => {}
                Some(k) => {
                    let alt = record.allele(*k).unwrap_or_default();
                    let hit = covered
                        .iter()
                        .find(|s| locus.signatures[**s].matches(&record.reference, alt));
                    match hit {
                        Some(s) => {
                            copies[copy].observed.insert(*s);
                            if unphased_het {
                                copies[copy].unphased.insert(*s);
                            }
                        }
                        None => copies[copy].unexplained.push(format!(
                            "{}:{} {}>{}",
                            record.normalized_chrom(),
                            record.pos,
                            record.reference,
                            alt
                        )),
                    }
                }
            }
        }
    }

    if called_records == 0 {
        debug!("{}: every covering record is a no-call", gene);
        return GeneResolution {
            diplotype: reference_pair(locus, ResolutionConfidence::NoCall, records.len(), quality),
            diagnostics,
        };
    }

    let split = split_unphased_candidates(locus, &mut copies);

    let mut calls: Vec<CopyCall> = copies
        .iter()
        .map(|obs| call_copy(locus, obs, &mut diagnostics))
        .collect();
    calls.sort_by_key(|c| locus.allele_rank(c.allele.label));

    let mut confidence = calls[0].confidence.min(calls[1].confidence);
    let diplotype_alleles = [calls[0].allele.label.to_string(), calls[1].allele.label.to_string()];
    if let Some(candidates) = split {
        confidence = confidence.min(ResolutionConfidence::Ambiguous);
        push_unique(
            &mut diagnostics,
            Diagnostic::AmbiguousDiplotype {
                gene,
                candidates,
                chosen: diplotype_alleles.join("/"),
            },
        );
    }
    let diplotype = Diplotype {
        gene,
        alleles: diplotype_alleles,
        confidence,
        covering_records: records.len(),
        call_quality: quality,
    };
    debug!(
        "{}: {} ({}) from {} record(s)",
        gene,
        diplotype.label(),
        confidence,
        records.len()
    );

    GeneResolution {
        diplotype,
        diagnostics,
    }
}

fn reference_pair(
    locus: &GeneLocus,
    confidence: ResolutionConfidence,
    covering_records: usize,
    call_quality: Option<f64>,
) -> Diplotype {
    let label = locus.reference().label.to_string();
    Diplotype {
        gene: locus.gene,
        alleles: [label.clone(), label],
        confidence,
        covering_records,
        call_quality,
    }
}

/// Non-reference alleles fully observed on one copy, minus nested ones.
fn copy_candidates<'a>(
    locus: &'a GeneLocus,
    observed: &BTreeSet<usize>,
) -> Vec<&'a AlleleDefinition> {
    let satisfied: Vec<&AlleleDefinition> = locus
        .alleles
        .iter()
        .filter(|a| !a.is_reference() && a.defining.is_subset(observed))
        .collect();

    // drop definitions nested inside a larger satisfied one
    satisfied
        .iter()
        .filter(|a| {
            !satisfied
                .iter()
                .any(|b| b.defining.len() > a.defining.len() && a.defining.is_subset(&b.defining))
        })
        .copied()
        .collect()
}

///
/// Move the runner-up of disjoint competing alleles to a copy that holds
/// only reference, when unphased heterozygous calls alone put it where it is.
///
/// Returns the labels that competed if anything moved.
///
fn split_unphased_candidates(
    locus: &GeneLocus,
    copies: &mut [CopyObservation; 2],
) -> Option<Vec<String>> {
    for (from, to) in [(1, 0), (0, 1)] {
        if !copies[to].observed.is_empty() || !copies[to].unexplained.is_empty() {
            continue;
        }
        let candidates = copy_candidates(locus, &copies[from].observed);
        if candidates.len() < 2 {
            continue;
        }
        let disjoint = candidates.iter().enumerate().all(|(i, a)| {
            candidates[i + 1..]
                .iter()
                .all(|b| a.defining.is_disjoint(&b.defining))
        });
        if !disjoint {
            continue;
        }

        let kept = pick_by_priority(&candidates);
        let rest: Vec<&AlleleDefinition> = candidates
            .iter()
            .filter(|a| a.label != kept.label)
            .copied()
            .collect();
        let moved = pick_by_priority(&rest);
        if !moved.defining.is_subset(&copies[from].unphased) {
            continue;
        }

        debug!("{}: {} placed in trans to {}", locus.gene, moved.label, kept.label);
        for s in &moved.defining {
            copies[from].observed.remove(s);
            copies[from].unphased.remove(s);
            copies[to].observed.insert(*s);
        }
        return Some(candidates.iter().map(|a| a.label.to_string()).collect());
    }
    None
}

fn call_copy<'a>(
    locus: &'a GeneLocus,
    obs: &CopyObservation,
    diagnostics: &mut Vec<Diagnostic>,
) -> CopyCall<'a> {
    let candidates = copy_candidates(locus, &obs.observed);

    let (allele, mut confidence) = match candidates.as_slice() {
        [] => (locus.reference(), ResolutionConfidence::Confirmed),
        [only] => (*only, ResolutionConfidence::Confirmed),
        several => {
            let chosen = pick_by_priority(several);
            push_unique(
                diagnostics,
                Diagnostic::AmbiguousDiplotype {
                    gene: locus.gene,
                    candidates: several.iter().map(|a| a.label.to_string()).collect(),
                    chosen: chosen.label.to_string(),
                },
            );
            (chosen, ResolutionConfidence::Ambiguous)
        }
    };

    let explained: BTreeSet<usize> = candidates
        .iter()
        .flat_map(|a| a.defining.iter().copied())
        .collect();
    let mut unexplained: Vec<String> = obs
        .observed
        .difference(&explained)
        .map(|s| locus.signatures[*s].describe())
        .collect();
    unexplained.extend(obs.unexplained.iter().cloned());

    if !unexplained.is_empty() {
        confidence = confidence.min(ResolutionConfidence::Inferred);
        push_unique(
            diagnostics,
            Diagnostic::PartialAlleleMatch {
                gene: locus.gene,
                unexplained,
                chosen: allele.label.to_string(),
            },
        );
    }
    if obs.missing {
        confidence = confidence.min(ResolutionConfidence::Inferred);
    }

    CopyCall { allele, confidence }
}

///
/// Lowest priority tier wins; within a tier the lexicographically smallest
/// label wins.
///
fn pick_by_priority<'a>(candidates: &[&'a AlleleDefinition]) -> &'a AlleleDefinition {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        let key = (candidate.function.priority(), candidate.label);
        if key < (best.function.priority(), best.label) {
            best = *candidate;
        }
    }
    best
}

fn push_unique(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    if !diagnostics.contains(&diagnostic) {
        diagnostics.push(diagnostic);
    }
}
