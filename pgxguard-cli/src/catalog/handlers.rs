use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;
use serde::Serialize;

use pgxguard_core::models::{Drug, Gene};
use pgxguard_engine::guidelines::GuidelineSource;
use pgxguard_engine::{GeneLocus, GuidelineTable, LocusIndex};

#[derive(Serialize)]
struct DrugEntry<'a> {
    name: &'static str,
    primary_gene: Gene,
    guideline_genes: Vec<Gene>,
    rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a GuidelineSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<&'a str>,
}

#[derive(Serialize)]
struct CatalogOutput<'a> {
    genes: &'a [GeneLocus],
    drugs: Vec<DrugEntry<'a>>,
}

fn drug_entries(table: &GuidelineTable) -> Vec<DrugEntry<'_>> {
    Drug::ALL
        .into_iter()
        .map(|drug| DrugEntry {
            name: drug.name(),
            primary_gene: drug.primary_gene(),
            guideline_genes: table.genes_for(drug),
            rules: table.rules().iter().filter(|r| r.drug == drug).count(),
            source: table.source(drug),
            fallback: table.fallback_text(drug),
        })
        .collect()
}

pub fn run_catalog(matches: &ArgMatches) -> Result<()> {
    let output_path = matches.get_one::<String>("output");
    let table = match matches.get_one::<String>("guidelines") {
        Some(p) => GuidelineTable::try_from(Path::new(p))
            .with_context(|| format!("Failed to load guideline table: {}", p))?,
        None => GuidelineTable::embedded().context("Failed to load the built-in guideline table")?,
    };
    let index = LocusIndex::grch38();

    let output = CatalogOutput {
        genes: index.loci(),
        drugs: drug_entries(&table),
    };
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

    Ok(())
}
