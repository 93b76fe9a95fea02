//! gqlmock CLI
//!
//! Validates mock files and replays scripted GraphQL operations against
//! them, printing every resolution the way an inspection panel would.

use clap::{Parser, Subcommand};
use gqlmock_core::MockConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod replay;

/// gqlmock - deterministic GraphQL mocks for isolated component rendering
#[derive(Parser, Debug)]
#[command(name = "gqlmock")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a mock file parses and every mock is valid
    Validate {
        /// Path to the mock file (JSON)
        mocks: PathBuf,
    },

    /// Resolve a JSONL operation script against a mock file
    Replay {
        /// Path to the mock file (JSON)
        mocks: PathBuf,

        /// Path to the operations file (one JSON operation per line)
        operations: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Validate { mocks } => match validate(&mocks) {
            Ok(count) => {
                println!("{}: {} valid mocks", mocks.display(), count);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Replay {
            mocks,
            operations,
            format,
        } => {
            let json_output = matches!(format, OutputFormat::Json);
            match replay::run(&mocks, &operations, json_output).await {
                Ok(summary) => {
                    if !json_output {
                        println!(
                            "{} operations: {} matched, {} unmatched, {} simulated failures",
                            summary.stats.total,
                            summary.stats.matched,
                            summary.stats.unmatched,
                            summary.stats.simulated_failures
                        );
                    }
                    if summary.stats.unmatched == 0 {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(2)
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn validate(path: &std::path::Path) -> gqlmock_core::Result<usize> {
    let config = MockConfig::load(path)?;
    let definitions = config.to_definitions()?;
    tracing::info!("Validated {} mocks from {}", definitions.len(), path.display());
    Ok(definitions.len())
}
