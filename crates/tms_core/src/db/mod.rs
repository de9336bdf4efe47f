//! Task store on SQLite: connection setup and schema versioning.
//!
//! Callers get connections only through [`open_db`] or
//! [`open_db_in_memory`], which hand back a database already at
//! [`migrations::latest_version`]. A file written by a newer build is refused
//! with [`DbError::SchemaTooNew`] rather than opened read-write.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Any failure reported by SQLite itself.
    Sqlite(rusqlite::Error),
    /// `user_version` on disk is ahead of the migrations this build ships.
    SchemaTooNew { found: u32, known: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, known } => write!(
                f,
                "task store schema v{found} was written by a newer build (this build knows v{known})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
