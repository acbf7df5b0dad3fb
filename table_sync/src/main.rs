//! table_sync CLI
//!
//! Brings a MySQL database in line with declared table descriptors.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use table_sync::config::{self, SyncMode};
use table_sync::utils::logging::init_logging;
use table_sync::{load_descriptors, TableSyncClient};

/// Create or update MySQL tables from table descriptors.
#[derive(Parser)]
#[command(name = "table_sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, or YAML by extension).
    #[arg(short, long)]
    config: PathBuf,

    /// Descriptor file with `[[tables]]` entries.
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Override the configured sync mode (none, create, update).
    #[arg(short, long)]
    mode: Option<SyncMode>,

    /// Show SQL without executing.
    #[arg(long)]
    dry_run: bool,

    /// Print the planned changes as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.to_string_lossy();
    let mut config = config::load_from_file(&config_path)
        .with_context(|| format!("loading {}", config_path))?;

    if let Some(mode) = cli.mode {
        config.sync.mode = mode;
    }
    if cli.dry_run {
        config.sync.dry_run = true;
    }

    init_logging(&config.logging)?;

    let mut client = TableSyncClient::new(config);

    if let Some(tables) = &cli.tables {
        let tables_path = tables.to_string_lossy();
        let descriptors = load_descriptors(&tables_path)
            .with_context(|| format!("loading {}", tables_path))?;
        info!(count = descriptors.len(), path = %tables_path, "Registering descriptor file");

        for descriptor in descriptors {
            client.registry_mut().register_descriptor(descriptor, false);
        }
    }

    let diff = client.sync_database().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    }

    Ok(())
}
