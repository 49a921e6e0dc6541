//! Roster configuration.
//!
//! # Responsibility
//! - Describe storage backend, grading scale and logging in one document.
//! - Build ready-to-use stores and repositories from that description.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - Unknown keys are rejected so typos do not silently fall back to defaults.
//!
//! Example document:
//!
//! ```json
//! {
//!   "storage": { "backend": "sqlite", "path": "/var/lib/roster/students.db" },
//!   "grades": { "min": 0, "max": 10 },
//!   "logging": { "level": "info", "dir": "/var/log/roster" }
//! }
//! ```

use crate::logging::{default_log_level, init_logging};
use crate::model::student::{GradeRange, InvalidGradeRange};
use crate::repo::student_repo::StudentRepository;
use crate::store::{
    JsonFileStore, SqliteStore, StudentStore, DEFAULT_JSON_FILE, DEFAULT_SQLITE_FILE,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Persistence backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One pretty-printed JSON document.
    #[default]
    Json,
    /// `Students` table in a SQLite database.
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Falls back to `students.json` / `students.db` when unset.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Effective target path for the configured backend.
    pub fn resolved_path(&self) -> PathBuf {
        match (&self.path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, StorageBackend::Json) => PathBuf::from(DEFAULT_JSON_FILE),
            (None, StorageBackend::Sqlite) => PathBuf::from(DEFAULT_SQLITE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub level: Option<String>,
    /// Absolute log directory. File logging stays off when unset.
    pub dir: Option<PathBuf>,
}

/// Top-level roster configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    pub storage: StorageConfig,
    pub grades: GradeRange,
    pub logging: LoggingConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    GradeRange(InvalidGradeRange),
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid roster config: {err}"),
            Self::GradeRange(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::GradeRange(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<InvalidGradeRange> for ConfigError {
    fn from(value: InvalidGradeRange) -> Self {
        Self::GradeRange(value)
    }
}

impl RosterConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.grade_range()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Validated grading scale.
    pub fn grade_range(&self) -> Result<GradeRange, ConfigError> {
        Ok(GradeRange::new(self.grades.min, self.grades.max)?)
    }

    /// Builds the configured store without touching storage.
    pub fn open_store(&self) -> Box<dyn StudentStore> {
        let path = self.storage.resolved_path();
        match self.storage.backend {
            StorageBackend::Json => Box::new(JsonFileStore::new(path)),
            StorageBackend::Sqlite => Box::new(SqliteStore::new(path)),
        }
    }

    /// Builds the configured store and loads the roster from it.
    pub fn open_repository(
        &self,
    ) -> Result<StudentRepository<Box<dyn StudentStore>>, ConfigError> {
        let grades = self.grade_range()?;
        Ok(StudentRepository::open(self.open_store(), grades))
    }

    /// Starts file logging when `logging.dir` is set.
    ///
    /// Returns whether logging was initialized.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = &self.logging.dir else {
            return Ok(false);
        };
        let level = self
            .logging
            .level
            .as_deref()
            .unwrap_or_else(|| default_log_level());
        init_logging(level, &dir.to_string_lossy()).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}
