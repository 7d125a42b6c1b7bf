//! AutoScholar profile CLI
//!
//! Inspects and edits the local profile store kept in an SQLite file.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use autoscholar_profiles::{ProfileError, ProfileStore, ProfileStoreConfig};
use autoscholar_store::{SqliteStore, StoreError};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::{execute, CliError, Command};

#[derive(Debug, Parser)]
#[command(name = "autoscholar", version, about = "Manage local AutoScholar profiles")]
struct Cli {
    /// Database file (default: <data_dir>/autoscholar/profiles.db)
    #[arg(long, env = "AUTOSCHOLAR_DB")]
    db: Option<PathBuf>,

    /// Config file (default: <config_dir>/autoscholar/profiles.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(CliError::Profile(e)) if e.is_integrity_violation() => {
            eprintln!("Error: {e}");
            eprintln!(
                "The stored profiles are inconsistent; run `autoscholar reset` to start over."
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = match &cli.config {
        Some(path) => ProfileStoreConfig::load(path).map_err(ProfileError::from)?,
        None => ProfileStoreConfig::load_standard(),
    };

    let db_path = cli.db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Storage(format!("create {:?}: {}", parent, e)))?;
        }
    }
    tracing::debug!("Using profile database {:?}", db_path);

    let store = ProfileStore::with_config(SqliteStore::open(&db_path)?, config);
    let output = execute(&store, cli.command)?;
    Ok(serde_json::to_string_pretty(&output)?)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoscholar")
        .join("profiles.db")
}
