// ABOUTME: Readiness prober that blocks until the database answers queries
// ABOUTME: Retries forever by default with a fixed backoff between attempts

use crate::config::Config;
use crate::postgres;
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

/// Fixed backoff between connectivity attempts.
const PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Block until the database accepts a connection and answers `SELECT 1`.
///
/// Connection refusal is treated as transient and retried after a fixed
/// backoff, with no upper bound by default. Passing `max_attempts` turns the
/// wait into a hard deadline: once that many attempts have failed, the last
/// error is returned with a timeout context instead of waiting forever.
pub async fn wait_until_ready(config: &Config, max_attempts: Option<u32>) -> Result<()> {
    wait_for(|| check_once(config), max_attempts).await
}

/// Retry a connectivity check with a fixed backoff until it succeeds.
async fn wait_for<F, Fut>(mut check: F, max_attempts: Option<u32>) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match check().await {
            Ok(()) => {
                tracing::info!("PostgreSQL is ready (attempt {})", attempt);
                return Ok(());
            }
            Err(e) => {
                if let Some(max) = max_attempts {
                    if attempt >= max {
                        return Err(e).with_context(|| {
                            format!("Database not ready after {} probe attempts", attempt)
                        });
                    }
                }
                tracing::info!(
                    "Waiting for PostgreSQL to be ready (attempt {} failed, retrying in {:?})",
                    attempt,
                    PROBE_INTERVAL
                );
                tokio::time::sleep(PROBE_INTERVAL).await;
            }
        }
    }
}

/// A single connectivity check: connect and issue a trivial query.
async fn check_once(config: &Config) -> Result<()> {
    let client = postgres::connect(config).await?;
    client
        .simple_query("SELECT 1")
        .await
        .context("Readiness query failed")?;
    Ok(())
}
