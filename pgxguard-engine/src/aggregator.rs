//! Folds rule matches into one classification per drug, and scans the
//! requested drugs for shared-enzyme bottlenecks.

use pgxguard_core::models::{
    Contributor, Diplotype, Drug, EvidenceLevel, InteractionSeverity, InteractionWarning,
    Phenotype, PhenotypeCall, ResolutionConfidence, RiskClassification,
};

use crate::loci::LocusIndex;
use crate::rules::RuleMatch;

pub fn evidence_confidence(level: EvidenceLevel) -> f64 {
    match level {
        EvidenceLevel::A => 0.9,
        EvidenceLevel::B => 0.7,
        EvidenceLevel::Other => 0.5,
    }
}

///
/// Penalty applied for how firmly the underlying phenotype was called.
///
/// Never increases from `Confirmed` down to `NoCall`.
///
pub fn confidence_factor(call: &PhenotypeCall) -> f64 {
    if call.phenotype == Phenotype::Indeterminate {
        return 0.4;
    }
    match call.confidence {
        ResolutionConfidence::Confirmed => 1.0,
        ResolutionConfidence::Inferred | ResolutionConfidence::Ambiguous => 0.7,
        ResolutionConfidence::NoCall => 0.4,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn match_confidence(m: &RuleMatch) -> f64 {
    round2((evidence_confidence(m.rule.evidence) * confidence_factor(m.call)).clamp(0.0, 1.0))
}

///
/// Final classification of one drug from its rule matches.
///
/// No match gives `Unknown` at 0.0. Otherwise the most severe label wins, and
/// the confidence and evidence are those of the winning match (the most
/// confident one when several matches share the top label). Every matched
/// gene is listed as a contributor.
///
pub fn classify_drug(
    drug: Drug,
    matches: &[RuleMatch],
    diplotypes: &[Diplotype],
) -> RiskClassification {
    let mut best: Option<(&RuleMatch, f64)> = None;
    for m in matches {
        let confidence = match_confidence(m);
        best = match best {
            Some((b, c)) if (b.rule.risk, c) >= (m.rule.risk, confidence) => Some((b, c)),
            _ => Some((m, confidence)),
        };
    }

    let Some((winner, confidence)) = best else {
        return RiskClassification::unknown(drug.name());
    };

    let contributors = matches
        .iter()
        .map(|m| Contributor {
            gene: m.call.gene,
            phenotype: m.call.phenotype,
            diplotype: diplotypes
                .iter()
                .find(|d| d.gene == m.call.gene)
                .map(|d| d.label())
                .unwrap_or_default(),
        })
        .collect();

    RiskClassification {
        drug: drug.name().to_string(),
        risk: winner.rule.risk,
        confidence,
        evidence: Some(winner.rule.evidence),
        contributors,
        matched_rule: Some(winner.rule.to_ref(winner.via_fallback)),
    }
}

///
/// Severity from the fraction of normal activity that is missing.
///
pub fn severity_for(deficit: f64, drug_count: usize) -> InteractionSeverity {
    let severity = if deficit >= 0.75 {
        InteractionSeverity::Critical
    } else if deficit >= 0.5 {
        InteractionSeverity::High
    } else {
        InteractionSeverity::Moderate
    };
    if drug_count >= 3 {
        severity.escalate()
    } else {
        severity
    }
}

///
/// One warning per gene that two or more requested drugs rely on (through
/// their matched rules) while its phenotype is Intermediate or Poor.
///
/// # Arguments
/// - per_drug: requested drugs in request order with their rule matches
/// - index: gives each gene's normal activity
///
pub fn scan_interactions(
    per_drug: &[(Drug, Vec<RuleMatch>)],
    index: &LocusIndex,
) -> Vec<InteractionWarning> {
    let mut warnings = Vec::new();
    if per_drug.len() < 2 {
        return warnings;
    }

    for locus in index.loci() {
        let mut drugs = Vec::new();
        let mut shared_call: Option<&PhenotypeCall> = None;
        for (drug, matches) in per_drug {
            if let Some(m) = matches.iter().find(|m| m.rule.gene == locus.gene) {
                drugs.push(*drug);
                shared_call = Some(m.call);
            }
        }

        let Some(call) = shared_call else { continue };
        if drugs.len() < 2 || !call.phenotype.is_reduced() {
            continue;
        }

        let deficit = if locus.normal_activity > 0.0 {
            ((locus.normal_activity - call.activity_score) / locus.normal_activity).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let deficit = (deficit * 1000.0).round() / 1000.0;

        warnings.push(InteractionWarning {
            gene: locus.gene,
            severity: severity_for(deficit, drugs.len()),
            drugs,
            phenotype: call.phenotype,
            activity_score: call.activity_score,
            activity_deficit: deficit,
        });
    }
    warnings
}
