mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pagestrip",
    version,
    about = "Strip platform boilerplate from scholarly PDFs for screen readers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF (or every PDF in a directory) to clean text
    Convert(ConvertArgs),
    /// Inspect and validate boilerplate pattern files
    Patterns {
        #[command(subcommand)]
        action: PatternsAction,
    },
}

#[derive(Args)]
pub struct ConvertArgs {
    /// PDF file or directory of PDFs
    pub input: PathBuf,

    /// Output file (single input) or directory
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the text to stdout instead of writing a file
    #[arg(long)]
    pub preview: bool,

    /// Keep abbreviations as printed (no "et al." -> "and others")
    #[arg(long)]
    pub faithful: bool,

    /// JSON config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra pattern file(s), appended after the built-in rules
    #[arg(short, long = "patterns", value_name = "FILE")]
    pub patterns: Vec<PathBuf>,

    /// Share of pages a line must repeat on to be stripped (0-1]
    #[arg(long, value_name = "F")]
    pub threshold: Option<f64>,

    /// Minimum page count before repetition analysis kicks in
    #[arg(long, value_name = "N")]
    pub min_pages: Option<usize>,

    /// Never run OCR, even on pages without a usable text layer
    #[arg(long)]
    pub no_ocr: bool,

    /// Write a JSON audit of every line decision (file, or directory for batches)
    #[arg(long, value_name = "FILE")]
    pub audit: Option<PathBuf>,

    /// Log progress and per-page warnings
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum PatternsAction {
    /// List the rules, grouped by platform
    List {
        /// Also list rules from these pattern files
        #[arg(short, long = "patterns", value_name = "FILE")]
        patterns: Vec<PathBuf>,
    },
    /// Validate a custom pattern file
    Validate {
        /// Path to JSON pattern file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Patterns { action } => match action {
            PatternsAction::List { patterns } => commands::patterns::list(&patterns),
            PatternsAction::Validate { file } => commands::patterns::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
