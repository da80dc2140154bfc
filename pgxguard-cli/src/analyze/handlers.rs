use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use indicatif::ProgressBar;
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;

use pgxguard_core::RunControl;
use pgxguard_engine::explain::explain;
use pgxguard_engine::{
    AnalysisContext, AnalysisReport, AnalysisRequest, GuidelineTable, LocusIndex, PipelineConfig,
    analyze,
};
use pgxguard_vcf::io::{get_dynamic_reader, read_bounded};

#[derive(Serialize)]
struct FileOutput {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeOutput {
    results: Vec<FileOutput>,
}

///
/// Parse the comma-separated `--drugs` value, dropping empty entries.
///
pub fn split_drug_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

fn build_context(matches: &ArgMatches) -> Result<AnalysisContext> {
    let config = match matches.get_one::<String>("config") {
        Some(p) => PipelineConfig::try_from(Path::new(p))
            .with_context(|| format!("Failed to load pipeline config: {}", p))?,
        None => PipelineConfig::default(),
    };
    let guidelines = match matches.get_one::<String>("guidelines") {
        Some(p) => GuidelineTable::try_from(Path::new(p))
            .with_context(|| format!("Failed to load guideline table: {}", p))?,
        None => GuidelineTable::embedded().context("Failed to load the built-in guideline table")?,
    };
    Ok(AnalysisContext::new(LocusIndex::grch38(), guidelines, config))
}

fn analyze_file(
    ctx: &AnalysisContext,
    path: &Path,
    drugs: &[String],
    version: Option<&String>,
    sample: Option<&String>,
    timeout: Option<Duration>,
    with_explanations: bool,
) -> Result<(AnalysisReport, Option<Vec<String>>)> {
    let limit = ctx.config().max_input_bytes;
    let reader = get_dynamic_reader(path, limit)?;
    let content = read_bounded(reader, limit)?;

    let mut request = AnalysisRequest::new(&content, drugs.to_vec());
    if let Some(v) = version {
        request = request.with_version(v);
    }
    if let Some(s) = sample {
        request = request.with_sample(s);
    }
    let control = match timeout {
        Some(t) => RunControl::unbounded().with_timeout(t),
        None => RunControl::unbounded(),
    };

    let report = analyze(ctx, &request, &control)?;
    let explanations = with_explanations.then(|| {
        report
            .classifications
            .iter()
            .map(|c| explain(ctx, c, &report))
            .collect()
    });
    Ok((report, explanations))
}

pub fn run_analyze(matches: &ArgMatches) -> Result<()> {
    let vcfs: Vec<PathBuf> = matches
        .get_many::<String>("vcf")
        .context("--vcf is required")?
        .map(PathBuf::from)
        .collect();
    let drugs = split_drug_list(
        matches
            .get_one::<String>("drugs")
            .context("--drugs is required")?,
    );
    let version = matches.get_one::<String>("version");
    let sample = matches.get_one::<String>("sample");
    let output_path = matches.get_one::<String>("output");
    let with_explanations = matches.get_flag("explain");
    let timeout = matches
        .get_one::<String>("timeout")
        .map(|t| t.parse::<u64>().map(Duration::from_secs))
        .transpose()
        .context("--timeout must be a whole number of seconds")?;
    let threads: usize = matches
        .get_one::<String>("threads")
        .map_or(Ok(0), |t| t.parse())
        .context("--threads must be a non-negative integer")?;

    let ctx = build_context(matches)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build worker pool")?;

    info!("Analyzing {} file(s) for {} drug(s)", vcfs.len(), drugs.len());
    let bar = ProgressBar::new(vcfs.len() as u64);

    let results: Vec<FileOutput> = pool.install(|| {
        vcfs.par_iter()
            .map(|path| {
                let outcome = analyze_file(
                    &ctx,
                    path,
                    &drugs,
                    version,
                    sample,
                    timeout,
                    with_explanations,
                );
                bar.inc(1);
                match outcome {
                    Ok((report, explanations)) => FileOutput {
                        input: path.display().to_string(),
                        report: Some(report),
                        explanations,
                        error: None,
                    },
                    Err(e) => {
                        error!("{}: {:#}", path.display(), e);
                        FileOutput {
                            input: path.display().to_string(),
                            report: None,
                            explanations: None,
                            error: Some(format!("{:#}", e)),
                        }
                    }
                }
            })
            .collect()
    });
    bar.finish_and_clear();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let output = AnalyzeOutput { results };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize output to JSON")?;

    match output_path {
        Some(p) => {
            let mut file = File::create(Path::new(p))
                .with_context(|| format!("Failed to create output file: {}", p))?;
            file.write_all(json.as_bytes())?;
            info!("Output written to {}", p);
        }
        None => {
            io::stdout().write_all(json.as_bytes())?;
            println!();
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} input file(s) failed", failed, vcfs.len()));
    }
    Ok(())
}
