// ABOUTME: CLI entry point for postgres-csv-backup
// ABOUTME: Builds the run configuration, probes readiness, and dispatches on mode

use clap::Parser;
use postgres_csv_backup::config::{Config, Mode};
use postgres_csv_backup::{commands, postgres};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "postgres-csv-backup")]
#[command(about = "Backup and restore a PostgreSQL database to per-table CSV files", long_about = None)]
struct Cli {
    /// Database user
    #[arg(long, env = "POSTGRES_USER")]
    user: String,
    /// Database password
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    password: String,
    /// Database name
    #[arg(long, env = "POSTGRES_DB")]
    database: String,
    /// Database host
    #[arg(long, env = "POSTGRES_HOST", default_value = "localhost")]
    host: String,
    /// Database port
    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    port: u16,
    /// Directory holding schema.sql and per-table CSV artifacts
    #[arg(long, env = "BACKUP_DIR", default_value = "./backup")]
    backup_dir: PathBuf,
    /// Run mode: backup or restore
    #[arg(long, env = "MODE", default_value = "backup")]
    mode: String,
    /// Give up after this many readiness probe attempts (default: wait forever)
    #[arg(long, env = "PROBE_MAX_ATTEMPTS")]
    probe_max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config {
        user: cli.user,
        password: cli.password,
        database: cli.database,
        host: cli.host,
        port: cli.port,
        backup_dir: cli.backup_dir,
    };

    // The readiness probe runs before any mode-specific work, in every mode.
    postgres::probe::wait_until_ready(&config, cli.probe_max_attempts).await?;

    match cli.mode.parse::<Mode>() {
        Ok(Mode::Backup) => commands::backup(&config).await,
        Ok(Mode::Restore) => commands::restore(&config).await,
        Err(e) => {
            tracing::error!("{:#}", e);
            Ok(())
        }
    }
}
