use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{
    OutputFormat, cycles_command, dereference_command, rules_command, validate_command,
};
use oaslint::document::Format;

#[derive(Parser)]
#[command(
    name = "oaslint",
    about = "Resolve references in OpenAPI documents and validate them against configurable rules",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against the built-in rules or a ruleset
    Validate {
        /// OpenAPI document (YAML or JSON)
        file: PathBuf,

        /// Ruleset file selecting which rules run and at what severity
        #[arg(short, long)]
        ruleset: Option<PathBuf>,

        /// How findings are printed
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Skip the structural schema check while loading
        #[arg(long)]
        no_structure_check: bool,
    },

    /// Print the document with every reference replaced by its target
    Dereference {
        file: PathBuf,

        /// Output format (defaults to the input format)
        #[arg(short, long, value_enum)]
        output_format: Option<Format>,

        /// Fail on circular references instead of keeping them as references
        #[arg(long)]
        strict_cycles: bool,
    },

    /// List the available rules, or the ones a ruleset enables
    Rules {
        /// Show the effective rules, severities and descriptions of this ruleset
        #[arg(short, long)]
        ruleset: Option<PathBuf>,
    },

    /// List reference cycles in a document
    Cycles { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            report_error(error);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Validate {
            file,
            ruleset,
            format,
            no_structure_check,
        } => validate_command(&file, ruleset.as_deref(), format, !no_structure_check),
        Commands::Dereference {
            file,
            output_format,
            strict_cycles,
        } => dereference_command(&file, output_format, strict_cycles).map(|()| true),
        Commands::Rules { ruleset } => rules_command(ruleset.as_deref()).map(|()| true),
        Commands::Cycles { file } => cycles_command(&file).map(|()| true),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("oaslint=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("oaslint=info"), // -v: info messages
        _ => EnvFilter::new("oaslint=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Library errors carry diagnostic codes; render those through miette
fn report_error(error: anyhow::Error) {
    match error.downcast::<oaslint::Error>() {
        Ok(error) => eprintln!("{:?}", miette::Report::new(error)),
        Err(error) => eprintln!("Error: {error:#}"),
    }
}
