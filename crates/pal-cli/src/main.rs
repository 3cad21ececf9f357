//! # palc entry point
//!
//! Parses command-line arguments, resolves settings and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pal_cli::compile::{run_compile, run_emit, CompileArgs, EmitArgs};
use pal_cli::records::{run_records, RecordsArgs};
use pal_cli::verify::{run_verify, VerifyArgs};
use pal_cli::{load_settings, EXIT_FAILURE};

/// PAL string detector toolchain.
///
/// Compiles a short string into the sum-of-products equations of a
/// recognizer state machine, turns the assembled bitstream into a
/// persisted configuration record, and checks programmed devices.
#[derive(Parser, Debug)]
#[command(name = "palc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a string to equations and, via the assembler, a persisted record.
    Compile(CompileArgs),

    /// Print the equations for a string.
    Emit(EmitArgs),

    /// List the records in a directory of persisted modules.
    Records(RecordsArgs),

    /// Program the simulated board with a record and run the conformance suite.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let result = match &cli.command {
        Commands::Compile(args) => run_compile(args, &settings),
        Commands::Emit(args) => run_emit(args),
        Commands::Records(args) => run_records(args),
        Commands::Verify(args) => run_verify(args, &settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
