//! Process configuration from CLI flags and `TMS_*` environment variables.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Backing store for the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// SQLite file at `--db-path`.
    Sqlite,
    /// Volatile process memory.
    Memory,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "tms-server", version, about = "REST service for to-do tasks")]
pub struct ServerConfig {
    /// Interface to bind.
    #[arg(long, env = "TMS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "TMS_PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "TMS_STORAGE", value_enum, default_value_t = StorageKind::Sqlite)]
    pub storage: StorageKind,

    /// SQLite database file, used when `--storage sqlite`.
    #[arg(long, env = "TMS_DB_PATH", default_value = "tms.sqlite3")]
    pub db_path: PathBuf,

    /// Upper bound for a single storage call, in milliseconds.
    #[arg(long, env = "TMS_STORAGE_TIMEOUT_MS", default_value_t = 5000)]
    pub storage_timeout_ms: u64,

    /// Extra attempts to open storage at startup before giving up.
    #[arg(long, env = "TMS_CONNECT_RETRIES", default_value_t = 5)]
    pub connect_retries: u32,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "TMS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr only when unset.
    #[arg(long, env = "TMS_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Parses `host:port` into a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| format!("invalid bind address `{}:{}`: {err}", self.host, self.port))
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(tms_core::default_log_level())
    }
}
