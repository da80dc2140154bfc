use pgxguard_core::models::{Diplotype, Phenotype, PhenotypeCall, ResolutionConfidence};

use crate::loci::GeneLocus;

///
/// Map a diplotype to a metabolizer phenotype through the gene's activity
/// bands.
///
/// The activity score is the sum of both allele activities. A `NoCall`
/// diplotype keeps the score of its default pair but is tagged
/// `Indeterminate`; every other confidence keeps the banded phenotype and
/// carries the confidence forward for scaling downstream.
///
pub fn classify(locus: &GeneLocus, diplotype: &Diplotype) -> PhenotypeCall {
    let activity_score: f64 = diplotype
        .alleles
        .iter()
        .map(|label| locus.activity_of(label))
        .sum();

    let phenotype = match diplotype.confidence {
        ResolutionConfidence::NoCall => Phenotype::Indeterminate,
        _ => locus.phenotype_for(activity_score),
    };

    PhenotypeCall {
        gene: diplotype.gene,
        phenotype,
        activity_score,
        confidence: diplotype.confidence,
    }
}
