// ABOUTME: Per-table data transfer using COPY streaming
// ABOUTME: Exports tables to CSV artifacts and loads artifacts back into tables

use crate::utils::quote_table;
use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{pin_mut, SinkExt, StreamExt};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_postgres::Client;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Stream a table's full contents into a CSV artifact.
///
/// The artifact carries a leading header row of column names and standard
/// comma delimiting and quoting, produced server-side by COPY. Any existing
/// artifact is overwritten. Returns the number of bytes written.
pub async fn export_table(client: &Client, table: &str, path: &Path) -> Result<u64> {
    let copy_sql = format!(
        "COPY {} TO STDOUT WITH (FORMAT csv, HEADER true)",
        quote_table(table)
    );
    let reader = client
        .copy_out(&copy_sql)
        .await
        .with_context(|| format!("COPY out failed for table '{}'", table))?;
    pin_mut!(reader);

    let mut file = File::create(path)
        .await
        .with_context(|| format!("Failed to create artifact {}", path.display()))?;

    let mut bytes_written: u64 = 0;
    while let Some(chunk) = reader.next().await {
        let data = chunk.with_context(|| format!("Error streaming rows from table '{}'", table))?;
        file.write_all(&data)
            .await
            .with_context(|| format!("Failed to write artifact {}", path.display()))?;
        bytes_written += data.len() as u64;
    }
    file.flush()
        .await
        .with_context(|| format!("Failed to flush artifact {}", path.display()))?;

    Ok(bytes_written)
}

/// Load a CSV artifact into the identically named table.
///
/// The artifact's header row is consumed by COPY, so column order follows
/// the header rather than table definition order. Returns the number of rows
/// loaded.
pub async fn import_table(client: &Client, table: &str, path: &Path) -> Result<u64> {
    let copy_sql = format!(
        "COPY {} FROM STDIN WITH (FORMAT csv, HEADER true)",
        quote_table(table)
    );
    let writer = client
        .copy_in(&copy_sql)
        .await
        .with_context(|| format!("COPY in failed for table '{}'", table))?;
    pin_mut!(writer);

    let mut file = File::open(path)
        .await
        .with_context(|| format!("Failed to open artifact {}", path.display()))?;

    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        if n == 0 {
            break;
        }
        writer
            .as_mut()
            .send(Bytes::copy_from_slice(&buf[..n]))
            .await
            .with_context(|| format!("Error streaming rows into table '{}'", table))?;
    }

    let rows = writer
        .finish()
        .await
        .with_context(|| format!("COPY into table '{}' failed", table))?;

    Ok(rows)
}

/// Advance the sequences behind a table's serial columns past the loaded rows.
///
/// Without this, inserts after a restore would draw ids already present in
/// the restored data. Runs per table after a successful load.
pub async fn reset_serial_sequences(client: &Client, table: &str) -> Result<()> {
    let columns = crate::postgres::catalog::serial_columns(client, table).await?;

    for column in &columns {
        let setval_sql = format!(
            "SELECT setval(
                 pg_get_serial_sequence('{}', '{}'),
                 COALESCE(MAX({}), 1),
                 MAX({}) IS NOT NULL
             ) FROM {}",
            quote_table(table).replace('\'', "''"),
            column.replace('\'', "''"),
            crate::utils::quote_ident(column),
            crate::utils::quote_ident(column),
            quote_table(table)
        );
        client
            .execute(&setval_sql, &[])
            .await
            .with_context(|| {
                format!(
                    "Failed to advance sequence for column '{}' of table '{}'",
                    column, table
                )
            })?;
    }

    if !columns.is_empty() {
        tracing::debug!(
            "Advanced {} sequence(s) for table '{}'",
            columns.len(),
            table
        );
    }
    Ok(())
}
