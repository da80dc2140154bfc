use clap::{Command, arg};

pub const CATALOG_CMD: &str = "catalog";

pub fn create_catalog_cli() -> Command {
    Command::new(CATALOG_CMD)
        .about("Print the tracked genes, their allele tables and the drug catalog as JSON.")
        .arg(
            arg!(--guidelines <FILE>)
                .required(false)
                .help("Guideline table to describe instead of the built-in one"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .help("Output JSON path (default: stdout)"),
        )
}
