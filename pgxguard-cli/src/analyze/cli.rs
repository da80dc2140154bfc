use clap::{Arg, ArgAction, Command, arg};

pub const ANALYZE_CMD: &str = "analyze";

pub fn create_analyze_cli() -> Command {
    Command::new(ANALYZE_CMD)
        .about("Predict drug risks from one or more single-sample VCF files.")
        .arg(
            Arg::new("vcf")
                .long("vcf")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Path(s) to input VCF or VCF.gz files"),
        )
        .arg(
            arg!(--drugs <DRUGS>)
                .required(true)
                .help("Comma-separated drug names, e.g. Codeine,Warfarin"),
        )
        .arg(
            arg!(--version <TAG>)
                .required(false)
                .help("Expected ##fileformat tag, e.g. VCFv4.2"),
        )
        .arg(
            arg!(--sample <SAMPLE>)
                .required(false)
                .help("Sample column to analyze (default: first sample)"),
        )
        .arg(
            arg!(--guidelines <FILE>)
                .required(false)
                .help("Guideline table (.toml, .json, .yaml) replacing the built-in one"),
        )
        .arg(
            arg!(--config <FILE>)
                .required(false)
                .help("Pipeline config TOML"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .help("Output JSON path (default: stdout)"),
        )
        .arg(
            arg!(--timeout <SECONDS>)
                .required(false)
                .help("Abandon a file's analysis after this many seconds"),
        )
        .arg(
            arg!(--threads <THREADS>)
                .required(false)
                .default_value("0")
                .help("Worker threads for multiple files (0: one per core)"),
        )
        .arg(arg!(--explain "Attach a text explanation to every classification"))
}
