//! Informational call-quality score for the records covering one gene.
//!
//! Each covering record scores a weighted mean of normalized QUAL (0.45),
//! normalized read depth (0.35) and annotation completeness (0.20); the gene
//! scores the mean over its records. Missing QUAL or depth scores 0.6.

use pgxguard_core::models::VariantRecord;

use crate::config::PipelineConfig;

const UNKNOWN_SCORE: f64 = 0.6;

const QUAL_WEIGHT: f64 = 0.45;
const DEPTH_WEIGHT: f64 = 0.35;
const ANNOTATION_WEIGHT: f64 = 0.20;

fn normalize(value: Option<f64>, min: f64, max: f64) -> f64 {
    match value {
        None => UNKNOWN_SCORE,
        Some(v) if v <= min => 0.0,
        Some(v) if v >= max => 1.0,
        Some(v) => ((v - min) / (max - min)).clamp(0.0, 1.0),
    }
}

fn annotation_score(record: &VariantRecord) -> f64 {
    let has_gene = record.info.contains_key("GENE");
    let has_star = record.info.contains_key("STAR") || record.info.contains_key("STAR_ALLELE");
    let has_rsid = record.ids.iter().any(|id| id.starts_with("rs"));
    [has_gene, has_star, has_rsid].iter().filter(|b| **b).count() as f64 / 3.0
}

pub fn record_quality(record: &VariantRecord, config: &PipelineConfig) -> f64 {
    let qual = normalize(record.quality, config.qual_min, config.qual_max);
    let depth = normalize(
        record.depth.map(f64::from),
        config.depth_min,
        config.depth_max,
    );
    (QUAL_WEIGHT * qual + DEPTH_WEIGHT * depth + ANNOTATION_WEIGHT * annotation_score(record))
        .clamp(0.0, 1.0)
}

///
/// Mean record quality, rounded to three decimals. `None` when no record
/// covers the gene.
///
pub fn call_quality<'a, I>(records: I, config: &PipelineConfig) -> Option<f64>
where
    I: IntoIterator<Item = &'a VariantRecord>,
{
    let scores: Vec<f64> = records
        .into_iter()
        .map(|r| record_quality(r, config))
        .collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 1000.0).round() / 1000.0)
}
