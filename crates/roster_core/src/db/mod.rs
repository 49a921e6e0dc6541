//! SQLite bootstrap for the relational roster store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for `SqliteStore`.
//! - Bring the `Students` schema up to date, adopting tables created by
//!   earlier unversioned tools.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A connection is only handed out once `Students` has every column the
//!   store reads and writes.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer roster build.
    NewerSchema { found: u32, supported: u32 },
    /// An existing `Students` table lacks columns the store needs.
    StudentsTableMismatch { missing_columns: Vec<&'static str> },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "roster database uses schema v{found}, this build understands up to v{supported}"
            ),
            Self::StudentsTableMismatch { missing_columns } => write!(
                f,
                "existing Students table is missing columns: {}",
                missing_columns.join(", ")
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
