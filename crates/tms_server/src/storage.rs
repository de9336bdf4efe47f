//! Startup storage connection with bounded exponential backoff.
//!
//! Storage is opened before the listener is bound: a process that cannot
//! reach its store never accepts traffic.

use crate::config::{ServerConfig, StorageKind};
use crate::state::DynTaskRepository;
use anyhow::Context;
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tms_core::db::{open_db, DbError};
use tms_core::{InMemoryTaskRepository, RepoError, SqliteTaskRepository};

const BACKOFF_BASE: Duration = Duration::from_millis(200);
const BACKOFF_CAP: Duration = Duration::from_secs(5);

/// Opens the repository selected by `config`.
///
/// SQLite failures that may be transient are retried `connect_retries`
/// times; schema mismatches fail immediately.
pub async fn open_repository(config: &ServerConfig) -> anyhow::Result<DynTaskRepository> {
    match config.storage {
        StorageKind::Memory => {
            info!("event=storage_open module=storage status=ok mode=memory");
            Ok(Box::new(InMemoryTaskRepository::new()))
        }
        StorageKind::Sqlite => {
            let repo = open_sqlite_with_retry(config.db_path.clone(), config.connect_retries)
                .await?;
            Ok(Box::new(repo))
        }
    }
}

async fn open_sqlite_with_retry(
    path: PathBuf,
    retries: u32,
) -> anyhow::Result<SqliteTaskRepository> {
    let mut attempt = 0;
    loop {
        let attempt_path = path.clone();
        let result = tokio::task::spawn_blocking(move || open_sqlite(attempt_path))
            .await
            .context("storage open task aborted")?;

        match result {
            Ok(repo) => {
                info!(
                    "event=storage_open module=storage status=ok mode=sqlite attempt={}",
                    attempt + 1
                );
                return Ok(repo);
            }
            Err(err) if is_transient(&err) && attempt < retries => {
                let delay = backoff_delay(attempt);
                warn!(
                    "event=storage_open module=storage status=retry mode=sqlite attempt={} delay_ms={} error={}",
                    attempt + 1,
                    delay.as_millis(),
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                error!(
                    "event=storage_open module=storage status=error mode=sqlite attempts={} error={}",
                    attempt + 1,
                    err
                );
                return Err(anyhow::Error::new(err).context(format!(
                    "failed to open task database `{}`",
                    path.display()
                )));
            }
        }
    }
}

fn open_sqlite(path: PathBuf) -> Result<SqliteTaskRepository, RepoError> {
    let conn = open_db(path)?;
    SqliteTaskRepository::try_new(conn)
}

fn is_transient(err: &RepoError) -> bool {
    matches!(err, RepoError::Db(DbError::Sqlite(_)))
}

/// Delay before retry number `attempt + 1`: doubles from 200 ms, capped at 5 s.
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    BACKOFF_BASE.saturating_mul(factor).min(BACKOFF_CAP)
}
