//! Persistence adapters for the student roster.
//!
//! # Responsibility
//! - Define the full-collection load/save contract used by the repository.
//! - Keep storage formats (JSON document, SQLite table) behind one trait.
//!
//! # Invariants
//! - `save` replaces the stored collection entirely; no append/merge.
//! - `load` never fails: read errors are logged and degrade to an empty roster.
//! - Adapters hold no roster state between calls besides their target.

use crate::db::DbError;
use crate::model::student::{Student, StudentId};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub mod json;
pub mod sqlite;

pub use json::{JsonFileStore, DEFAULT_JSON_FILE};
pub use sqlite::{SqliteStore, DEFAULT_SQLITE_FILE};

pub type StoreResult<T> = Result<T, PersistenceError>;

/// Which side hands out ids for new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdAuthority {
    /// The repository's running counter (`max(id) + 1`).
    Repository,
    /// The store's own sequence, queried through `StudentStore::allocate_id`.
    Store,
}

/// Underlying cause of a persistence failure.
#[derive(Debug)]
pub enum StoreCause {
    Io(std::io::Error),
    Json(serde_json::Error),
    Db(DbError),
}

impl Display for StoreCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreCause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreCause {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreCause {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for StoreCause {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreCause {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Failure reported by a persistence adapter.
#[derive(Debug)]
pub enum PersistenceError {
    ReadFailure { target: PathBuf, cause: StoreCause },
    WriteFailure { target: PathBuf, cause: StoreCause },
    Unsupported { operation: &'static str },
}

impl PersistenceError {
    /// Read failure on `target`; also usable by stores outside this crate.
    pub fn read(target: &Path, cause: impl Into<StoreCause>) -> Self {
        Self::ReadFailure {
            target: target.to_path_buf(),
            cause: cause.into(),
        }
    }

    pub fn write(target: &Path, cause: impl Into<StoreCause>) -> Self {
        Self::WriteFailure {
            target: target.to_path_buf(),
            cause: cause.into(),
        }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReadFailure { .. } => "read_failure",
            Self::WriteFailure { .. } => "write_failure",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailure { target, cause } => {
                write!(f, "failed to read roster from `{}`: {cause}", target.display())
            }
            Self::WriteFailure { target, cause } => {
                write!(f, "failed to write roster to `{}`: {cause}", target.display())
            }
            Self::Unsupported { operation } => {
                write!(f, "operation `{operation}` is not supported by this store")
            }
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadFailure { cause, .. } | Self::WriteFailure { cause, .. } => Some(cause),
            Self::Unsupported { .. } => None,
        }
    }
}

/// Full-collection persistence contract for the roster.
pub trait StudentStore {
    /// Reads every stored record, surfacing read/parse failures.
    fn try_load(&self) -> StoreResult<Vec<Student>>;

    /// Replaces stored contents with `students`.
    fn save(&mut self, students: &[Student]) -> StoreResult<()>;

    /// Points subsequent load/save calls at a new target. Does not load.
    fn set_target(&mut self, target: PathBuf);

    /// Currently configured target.
    fn target(&self) -> &Path;

    /// Short backend name used in log lines.
    fn backend_name(&self) -> &'static str;

    /// Reads every stored record, degrading to an empty roster on failure.
    fn load(&self) -> Vec<Student> {
        match self.try_load() {
            Ok(students) => students,
            Err(err) => {
                warn!(
                    "event=store_load module=store backend={} status=degraded error_code={} error={}",
                    self.backend_name(),
                    err.code(),
                    err
                );
                Vec::new()
            }
        }
    }

    fn id_authority(&self) -> IdAuthority {
        IdAuthority::Repository
    }

    /// Reserves the id for the next new record when the store owns ids.
    fn allocate_id(&mut self) -> StoreResult<StudentId> {
        Err(PersistenceError::Unsupported {
            operation: "allocate_id",
        })
    }
}

impl<S: StudentStore + ?Sized> StudentStore for Box<S> {
    fn try_load(&self) -> StoreResult<Vec<Student>> {
        (**self).try_load()
    }

    fn save(&mut self, students: &[Student]) -> StoreResult<()> {
        (**self).save(students)
    }

    fn set_target(&mut self, target: PathBuf) {
        (**self).set_target(target)
    }

    fn target(&self) -> &Path {
        (**self).target()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn load(&self) -> Vec<Student> {
        (**self).load()
    }

    fn id_authority(&self) -> IdAuthority {
        (**self).id_authority()
    }

    fn allocate_id(&mut self) -> StoreResult<StudentId> {
        (**self).allocate_id()
    }
}
