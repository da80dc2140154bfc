mod analyze;
mod catalog;

use anyhow::Result;
use clap::{ArgMatches, Command, arg};
use log::{Level, error};
use simple_logger::init_with_level;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "pgxguard";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Pharmacogenomic drug risk prediction from patient genotypes.")
        .subcommand_required(true)
        .arg(arg!(--verbose "Log debug messages").global(true))
        .subcommand(analyze::cli::create_analyze_cli())
        .subcommand(catalog::cli::create_catalog_cli())
}

fn init_logging(matches: &ArgMatches) -> Result<()> {
    let level = if matches.get_flag("verbose") {
        Level::Debug
    } else {
        Level::Info
    };
    init_with_level(level)?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        //
        // ANALYZE
        //
        Some((analyze::cli::ANALYZE_CMD, matches)) => {
            init_logging(matches)?;
            analyze::handlers::run_analyze(matches)?;
        }

        //
        // CATALOG
        //
        Some((catalog::cli::CATALOG_CMD, matches)) => {
            init_logging(matches)?;
            catalog::handlers::run_catalog(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

fn main() {
    let app = build_parser();
    let matches = app.get_matches();

    run(&matches).unwrap_or_else(|e| {
        error!("{:#}", e);
        std::process::exit(1);
    });
}
