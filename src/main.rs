use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dbmock_rs::config::ConfigLoader;
use dbmock_rs::database::mock::fixture;
use dbmock_rs::logging::{init_logging, LogConfig};

#[derive(Debug, Parser)]
#[command(name = "dbmock-rs", about = "Check dbmock expectation fixtures.")]
struct Cli {
    /// Configuration file (defaults to dbmock.toml / config/dbmock.*)
    #[arg(long, short, value_name = "FILE", env = "DBMOCK_CONFIG")]
    config: Option<String>,

    /// Override the configured log level
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load fixture files and compile every pattern.
    Validate {
        /// Fixture files; the configured fixtures are used when omitted.
        #[arg(value_name = "FIXTURE")]
        fixtures: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load_from_file(cli.config.as_deref())
        .load_from_env()
        .build()?;

    let mut log_config = LogConfig::from_settings(&config.log);
    if let Some(level) = cli.log_level {
        log_config = log_config.with_level(level);
    }
    init_logging(&log_config)?;

    match cli.command {
        Command::Validate { fixtures } => {
            let reports = fixture::validate_fixtures(&fixtures, &config)?;
            for report in reports {
                println!(
                    "✅ {}: {} expectations",
                    report.path.display(),
                    report.expectations
                );
            }
            Ok(())
        }
    }
}
