//! legacy-sqlite-migrate CLI - run or inspect the one-time store migration.

use clap::{Parser, Subcommand};
use legacy_sqlite_migrate::{
    guard, Config, DestinationStore, GuardDecision, NoopConsumerRegistry, Orchestrator,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "legacy-sqlite-migrate")]
#[command(about = "One-time migration of the legacy embedded database into SQLite")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the migration
    Run,

    /// Evaluate the run-once guard and print the decision, without copying
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.verbosity);

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Run => {
            let orchestrator = Orchestrator::new(config, Arc::new(NoopConsumerRegistry));
            let outcome = orchestrator.run();

            if cli.output_json {
                match outcome.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Failed to serialize outcome: {}", e),
                }
            }

            // A failed or skipped migration never fails host startup, and
            // this binary mirrors that contract.
            ExitCode::SUCCESS
        }
        Commands::Check => {
            let decision = guard::evaluate(&config.source.locator, || {
                let destination = DestinationStore::open(&config.destination.path)?;
                destination.row_count(&config.migration.check_table)
            });

            match decision {
                Ok(GuardDecision::Proceed { source_file, .. }) => {
                    println!("would migrate {}", source_file.display());
                }
                Ok(GuardDecision::Skip(reason)) => {
                    println!("would skip: {}", reason);
                }
                Err(e) => {
                    eprintln!("could not evaluate guard: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
    }
}

fn init_logging(verbosity: &str) {
    let level = match verbosity {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
