//! Plain-text explanation of a risk classification.
//!
//! Output is assembled only from table text, the report and the
//! classification, so the same inputs always give the same text.

use std::str::FromStr;

use pgxguard_core::models::{Diagnostic, Drug, Gene, RiskClassification, RiskLabel};

use crate::analysis::AnalysisReport;
use crate::context::AnalysisContext;

///
/// Render a deterministic explanation for one classification of a report.
///
/// # Arguments
/// - ctx: supplies the rationale/action text and citations
/// - classification: one entry of `report.classifications`
/// - report: supplies genotype details and interaction warnings
///
pub fn explain(
    ctx: &AnalysisContext,
    classification: &RiskClassification,
    report: &AnalysisReport,
) -> String {
    let Ok(drug) = Drug::from_str(&classification.drug) else {
        return format!(
            "{}: Unknown\n{} is not in the supported drug catalog, \
             so no pharmacogenomic guidance is available.",
            classification.drug, classification.drug
        );
    };

    let mut lines = Vec::new();
    match (&classification.matched_rule, classification.risk) {
        (Some(rule), risk) if risk != RiskLabel::Unknown => {
            lines.push(format!(
                "{}: {} (confidence {:.2}, evidence level {})",
                drug, risk, classification.confidence, rule.evidence
            ));
            for contributor in &classification.contributors {
                lines.push(genotype_line(report, contributor.gene, &contributor.diplotype));
            }
            if let Some(text) = ctx.guidelines().rationale_text(&rule.rationale_key) {
                lines.push(format!("Rationale: {}", text));
            }
            if let Some(text) = ctx.guidelines().action_text(&rule.action_key) {
                lines.push(format!("Recommendation: {}", text));
            }
            if rule.via_fallback {
                lines.push(format!(
                    "Note: the {} phenotype could not be determined from the input; \
                     the {} guidance was applied.",
                    rule.gene, rule.phenotype
                ));
            }
        }
        _ => {
            lines.push(format!("{}: Unknown", drug));
            lines.push(
                "Insufficient data: no guideline rule matched the genotype observed in this sample."
                    .to_string(),
            );
            for gene in ctx.guidelines().genes_for(drug) {
                if let Some(g) = report.gene(gene) {
                    lines.push(genotype_line(report, gene, &g.diplotype.label()));
                }
            }
            if let Some(text) = ctx.guidelines().fallback_text(drug) {
                lines.push(format!("Recommendation: {}", text));
            }
        }
    }

    if drug == Drug::Warfarin {
        for diagnostic in &report.diagnostics {
            if let Diagnostic::WarfarinSensitivity { rsid, genotype, .. } = diagnostic {
                lines.push(format!(
                    "Modifier: VKORC1 {} ({}) detected; consider a 40-50% lower warfarin dose.",
                    rsid, genotype
                ));
            }
        }
    }

    for warning in report.interactions.iter().filter(|w| w.drugs.contains(&drug)) {
        let others: Vec<&str> = warning
            .drugs
            .iter()
            .filter(|d| **d != drug)
            .map(|d| d.name())
            .collect();
        lines.push(format!(
            "Interaction ({:?}): {} {} is also relied on by {} (activity deficit {:.2}).",
            warning.severity,
            warning.gene,
            warning.phenotype,
            others.join(", "),
            warning.activity_deficit
        ));
    }

    if let Some(source) = ctx.guidelines().source(drug) {
        lines.push(format!("Source: {} <{}>", source.title, source.url));
    }

    lines.join("\n")
}

fn genotype_line(report: &AnalysisReport, gene: Gene, label: &str) -> String {
    match report.gene(gene) {
        Some(g) => format!(
            "Genotype: {} {} ({}), {}, activity score {:.2}",
            gene, label, g.diplotype.confidence, g.phenotype.phenotype, g.phenotype.activity_score
        ),
        None => format!("Genotype: {} {}", gene, label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pgxguard_core::RunControl;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::analysis::{AnalysisRequest, analyze};

    const HEADER: &str = concat!(
        "##fileformat=VCFv4.2\n",
        "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n",
    );

    const CYP2D6_PM: &str = concat!(
        "22\t42128945\trs3892097\tC\tT\t99\tPASS\t.\tGT\t1/1\n",
        "22\t42130692\trs1065852\tG\tA\t99\tPASS\t.\tGT\t1/1\n",
    );

    #[fixture]
    fn ctx() -> AnalysisContext {
        AnalysisContext::with_defaults().unwrap()
    }

    fn run(ctx: &AnalysisContext, body: &str, drugs: &[&str]) -> AnalysisReport {
        let content = format!("{}{}", HEADER, body);
        let request = AnalysisRequest::new(
            content.as_bytes(),
            drugs.iter().map(|d| d.to_string()).collect(),
        );
        analyze(ctx, &request, &RunControl::unbounded()).unwrap()
    }

    #[rstest]
    fn test_explain_matched_rule(ctx: AnalysisContext) {
        let report = run(&ctx, CYP2D6_PM, &["Codeine"]);
        let text = explain(&ctx, &report.classifications[0], &report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Codeine: Ineffective (confidence 0.90, evidence level A)");
        assert!(lines[1].starts_with("Genotype: CYP2D6 *4/*4 (Confirmed)"));
        assert!(text.contains("Rationale: Codeine is a prodrug"));
        assert!(text.contains("Recommendation: Avoid codeine."));
        assert!(!text.contains("Note:"));
        assert!(text.ends_with("<https://cpicpgx.org/guidelines/codeine-and-cyp2d6/>"));
    }

    #[rstest]
    fn test_explain_is_deterministic(ctx: AnalysisContext) {
        let body = "22\t42128945\trs3892097\tC\tT\t99\tPASS\t.\tGT\t0/1\n";
        let first = run(&ctx, body, &["Codeine", "Paroxetine"]);
        let second = run(&ctx, body, &["Codeine", "Paroxetine"]);
        assert_eq!(
            explain(&ctx, &first.classifications[1], &first),
            explain(&ctx, &second.classifications[1], &second)
        );
    }

    #[rstest]
    fn test_explain_fallback_note(ctx: AnalysisContext) {
        let report = run(
            &ctx,
            "22\t42128945\trs3892097\tC\tT\t99\tPASS\t.\tGT\t0/0\n",
            &["Warfarin"],
        );
        let text = explain(&ctx, &report.classifications[0], &report);
        assert!(text.starts_with("Warfarin: Safe (confidence 0.36"));
        assert!(text.contains("Note: the CYP2C9 phenotype could not be determined"));
    }

    #[rstest]
    fn test_explain_insufficient_data(ctx: AnalysisContext) {
        let report = run(
            &ctx,
            "10\t94942290\trs1799853\tC\tT\t99\tPASS\t.\tGT\t0/0\n",
            &["Codeine"],
        );
        let text = explain(&ctx, &report.classifications[0], &report);
        assert!(text.starts_with("Codeine: Unknown\nInsufficient data"));
        assert!(text.contains("Genotype: CYP2D6 *1/*1 (NoCall), Indeterminate"));
        assert!(text.contains(
            "Recommendation: Avoid codeine in CYP2D6 poor or ultrarapid metabolizers"
        ));
    }

    #[rstest]
    fn test_explain_warfarin_sensitivity(ctx: AnalysisContext) {
        let body = concat!(
            "10\t94942290\trs1799853\tC\tT\t99\tPASS\t.\tGT\t0/1\n",
            "16\t31096368\trs9923231\tC\tT\t99\tPASS\t.\tGT\t0/1\n",
        );
        let report = run(&ctx, body, &["Warfarin", "Codeine"]);

        let warfarin = explain(&ctx, &report.classifications[0], &report);
        assert!(warfarin.contains(
            "Modifier: VKORC1 rs9923231 (0/1) detected; consider a 40-50% lower warfarin dose."
        ));
        let codeine = explain(&ctx, &report.classifications[1], &report);
        assert!(!codeine.contains("VKORC1"));
    }

    #[rstest]
    fn test_explain_drug_outside_catalog(ctx: AnalysisContext) {
        let report = run(
            &ctx,
            "22\t42128945\trs3892097\tC\tT\t99\tPASS\t.\tGT\t0/0\n",
            &["Codeine", "Aspirin"],
        );
        let text = explain(&ctx, &report.classifications[1], &report);
        assert_eq!(
            text,
            concat!(
                "Aspirin: Unknown\n",
                "Aspirin is not in the supported drug catalog, ",
                "so no pharmacogenomic guidance is available."
            )
        );
    }

    #[rstest]
    fn test_explain_lists_interactions(ctx: AnalysisContext) {
        let report = run(&ctx, CYP2D6_PM, &["Codeine", "Fluoxetine"]);
        let text = explain(&ctx, &report.classifications[0], &report);
        assert!(text.contains(concat!(
            "Interaction (Critical): CYP2D6 Poor Metabolizer is also relied on by Fluoxetine ",
            "(activity deficit 1.00)."
        )));
    }
}
