use pgxguard_core::models::{Drug, PhenotypeCall};

use crate::guidelines::{GuidelineRule, GuidelineTable};
use crate::loci::LocusIndex;

///
/// One guideline rule that applies to a requested drug through one gene's
/// phenotype call.
///
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<'a> {
    pub rule: &'a GuidelineRule,
    pub call: &'a PhenotypeCall,
    /// The rule was keyed on the gene's fallback phenotype, not the called one
    pub via_fallback: bool,
}

///
/// Collect every rule that applies to a drug across all called genes.
///
/// Each gene is looked up by its exact phenotype first. When no rule has that
/// key and the gene declares a fallback phenotype bucket, the fallback key is
/// tried. The matches come back unranked, in gene order.
///
pub fn match_drug<'a>(
    table: &'a GuidelineTable,
    index: &LocusIndex,
    calls: &'a [PhenotypeCall],
    drug: Drug,
) -> Vec<RuleMatch<'a>> {
    let mut matches = Vec::new();
    for call in calls {
        if let Some(rule) = table.get(call.gene, call.phenotype, drug) {
            matches.push(RuleMatch {
                rule,
                call,
                via_fallback: false,
            });
            continue;
        }

        let fallback = index
            .locus(call.gene)
            .and_then(|locus| locus.fallback_phenotype)
            .filter(|p| *p != call.phenotype);
        if let Some(rule) = fallback.and_then(|p| table.get(call.gene, p, drug)) {
            matches.push(RuleMatch {
                rule,
                call,
                via_fallback: true,
            });
        }
    }
    matches
}
