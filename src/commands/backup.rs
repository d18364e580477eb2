// ABOUTME: Backup pipeline: schema export, table enumeration, per-table CSV export
// ABOUTME: Isolates per-table failures so a partial backup is an accepted outcome

use crate::config::Config;
use crate::postgres::{self, catalog};
use crate::{copy, schema, utils};
use anyhow::{Context, Result};
use std::fs;

/// Run the backup pipeline against the configured database.
///
/// Sequencing: schema export first (fatal on failure, no table export is
/// attempted without a schema artifact), then table enumeration, then one
/// independent CSV export per table. A table's export failure is logged and
/// does not stop its siblings.
pub async fn backup(config: &Config) -> Result<()> {
    tracing::info!(
        "Backing up database '{}' to {}",
        config.database,
        config.backup_dir.display()
    );

    fs::create_dir_all(&config.backup_dir).with_context(|| {
        format!(
            "Failed to create backup directory {}",
            config.backup_dir.display()
        )
    })?;

    let client = postgres::connect(config).await?;

    schema::dump_schema(&client, &config.schema_file())
        .await
        .context("Schema export failed, aborting backup")?;

    let tables = match catalog::list_tables(&client).await {
        Ok(tables) => tables,
        Err(e) => {
            tracing::error!("Failed to enumerate tables: {:#}", e);
            return Ok(());
        }
    };

    if tables.is_empty() {
        tracing::warn!(
            "No tables found in database '{}', nothing to export",
            config.database
        );
        return Ok(());
    }

    let mut exported = 0usize;
    let mut failed = 0usize;
    for table in &tables {
        if let Err(e) = utils::validate_table_name(table) {
            tracing::error!("Skipping table with unsupported name: {:#}", e);
            failed += 1;
            continue;
        }

        let path = config.table_file(table);
        tracing::info!("Exporting table '{}'", table);
        match copy::export_table(&client, table, &path).await {
            Ok(bytes) => {
                tracing::info!("✓ Table '{}' exported ({} bytes)", table, bytes);
                exported += 1;
            }
            Err(e) => {
                tracing::error!("Failed to export table '{}': {:#}", table, e);
                failed += 1;
            }
        }
    }

    tracing::info!(
        "Backup complete: {} table(s) exported, {} failed",
        exported,
        failed
    );
    Ok(())
}
