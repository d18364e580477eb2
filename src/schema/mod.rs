// ABOUTME: Schema export and restore built on catalog introspection
// ABOUTME: Writes the schema artifact during backup and replays it during restore

pub mod render;

use crate::postgres::catalog::{self, ColumnDef, ConstraintDef, SequenceDef};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio_postgres::Client;

/// Structural definition of one table.
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<ConstraintDef>,
    pub indexes: Vec<String>,
}

/// Structural definition of the public schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaDef {
    pub sequences: Vec<SequenceDef>,
    pub tables: Vec<TableDef>,
}

/// Export the structural definition of the public schema to `path`.
///
/// Introspects sequences, tables, constraints, and indexes through the
/// client connection and renders them as DDL, overwriting any existing
/// artifact. Any failure here is fatal to the backup run.
pub async fn dump_schema(client: &Client, path: &Path) -> Result<()> {
    let schema = introspect(client).await?;
    let sql = render::render_schema(&schema);

    tokio::fs::write(path, sql)
        .await
        .with_context(|| format!("Failed to write schema artifact {}", path.display()))?;

    tracing::info!(
        "✓ Schema exported to {} ({} tables, {} sequences)",
        path.display(),
        schema.tables.len(),
        schema.sequences.len()
    );
    Ok(())
}

/// Read the whole structural definition of the public schema.
async fn introspect(client: &Client) -> Result<SchemaDef> {
    let sequences = catalog::list_sequences(client).await?;
    let names = catalog::list_tables(client)
        .await
        .context("Failed to enumerate tables for schema export")?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let columns = catalog::table_columns(client, &name).await?;
        let constraints = catalog::table_constraints(client, &name).await?;
        let indexes = catalog::table_indexes(client, &name).await?;
        tables.push(TableDef {
            name,
            columns,
            constraints,
            indexes,
        });
    }

    Ok(SchemaDef { sequences, tables })
}

/// Replay the schema artifact at `path` against the target database.
///
/// The artifact is executed as one batch; a failing statement aborts the
/// whole replay, which in turn aborts the restore before any table data
/// is loaded.
pub async fn apply_schema(client: &Client, path: &Path) -> Result<()> {
    let sql = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read schema artifact {}", path.display()))?;

    if sql.trim().is_empty() {
        bail!("Schema artifact {} is empty", path.display());
    }

    client
        .batch_execute(&sql)
        .await
        .context("Failed to apply schema statements")?;

    tracing::info!("✓ Schema applied from {}", path.display());
    Ok(())
}
