// ABOUTME: Restore pipeline: precondition checks, schema replay, per-artifact CSV load
// ABOUTME: Table loads are isolated so one bad artifact does not block the rest

use crate::config::{self, Config};
use crate::postgres;
use crate::{copy, schema, utils};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Run the restore pipeline against the configured database.
///
/// Preconditions are checked before any database mutation: the backup
/// directory and the schema artifact must both exist. The schema is applied
/// first (fatal on failure, no table is loaded into a database whose tables
/// were never created), then every discovered CSV artifact is loaded into
/// the table named by its file stem.
pub async fn restore(config: &Config) -> Result<()> {
    tracing::info!(
        "Restoring database '{}' from {}",
        config.database,
        config.backup_dir.display()
    );

    if !config.backup_dir.is_dir() {
        bail!(
            "Backup directory {} not found",
            config.backup_dir.display()
        );
    }
    let schema_file = config.schema_file();
    if !schema_file.is_file() {
        bail!("Schema artifact {} not found", schema_file.display());
    }

    let artifacts = scan_artifacts(&config.backup_dir)?;

    let client = postgres::connect(config).await?;

    schema::apply_schema(&client, &schema_file)
        .await
        .context("Schema restore failed, aborting restore")?;

    if artifacts.is_empty() {
        tracing::warn!(
            "No table artifacts (*.{}) found in {}",
            config::TABLE_ARTIFACT_EXT,
            config.backup_dir.display()
        );
        return Ok(());
    }

    let mut loaded = 0usize;
    let mut failed = 0usize;
    for (table, path) in &artifacts {
        if let Err(e) = utils::validate_table_name(table) {
            tracing::error!(
                "Skipping artifact {} with unsupported table name: {:#}",
                path.display(),
                e
            );
            failed += 1;
            continue;
        }

        tracing::info!("Restoring table '{}'", table);
        match copy::import_table(&client, table, path).await {
            Ok(rows) => {
                tracing::info!("✓ Table '{}' restored ({} rows)", table, rows);
                loaded += 1;
                // Rows are in regardless; a sequence hiccup is not a load failure.
                if let Err(e) = copy::reset_serial_sequences(&client, table).await {
                    tracing::warn!(
                        "Could not advance sequences for table '{}': {:#}",
                        table,
                        e
                    );
                }
            }
            Err(e) => {
                tracing::error!("Failed to restore table '{}': {:#}", table, e);
                failed += 1;
            }
        }
    }

    tracing::info!(
        "Restore complete: {} table(s) loaded, {} failed",
        loaded,
        failed
    );
    Ok(())
}

/// Discover data artifacts in the backup directory.
///
/// Returns `(table, path)` pairs for every file carrying the artifact
/// extension, sorted by table name for a deterministic load order.
fn scan_artifacts(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read backup directory {}", dir.display()))?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(table) = config::table_name_from_artifact(&path) {
            artifacts.push((table, path));
        }
    }

    artifacts.sort();
    Ok(artifacts)
}
