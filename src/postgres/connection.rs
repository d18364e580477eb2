// ABOUTME: PostgreSQL connection utilities for the local target database
// ABOUTME: Handles connection setup and connection task lifecycle

use crate::config::Config;
use anyhow::{Context, Result};
use tokio_postgres::{Client, NoTls};

/// Connect to the database described by the connection profile.
///
/// The target is a local/loopback server, so the connection is plaintext.
/// The connection task is driven on a spawned tokio task; its errors are
/// logged rather than surfaced, matching the lifetime of a single run.
///
/// # Errors
///
/// Returns an error if the server is unreachable, authentication fails, or
/// the database does not exist.
pub async fn connect(config: &Config) -> Result<Client> {
    let (client, connection) = config
        .pg_config()
        .connect(NoTls)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("password authentication failed") {
                anyhow::anyhow!(
                    "Authentication failed for user '{}'. \
                     Check POSTGRES_USER and POSTGRES_PASSWORD.",
                    config.user
                )
            } else if msg.contains("does not exist") {
                anyhow::anyhow!(
                    "Database '{}' does not exist on {}:{}. Check POSTGRES_DB.",
                    config.database,
                    config.host,
                    config.port
                )
            } else {
                anyhow::anyhow!(
                    "Failed to connect to {}:{}: {}",
                    config.host,
                    config.port,
                    msg
                )
            }
        })
        .with_context(|| format!("Could not open connection to database '{}'", config.database))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unreachable_config() -> Config {
        Config {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "postgres".to_string(),
            host: "127.0.0.1".to_string(),
            // Reserved port, nothing listens here.
            port: 1,
            backup_dir: PathBuf::from("./backup"),
        }
    }

    #[tokio::test]
    async fn connect_to_unreachable_host_returns_error() {
        let result = connect(&unreachable_config()).await;
        assert!(result.is_err());
    }
}
