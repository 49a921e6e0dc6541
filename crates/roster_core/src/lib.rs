//! Core of the student roster.
//! Owns record validation, id allocation, and roster persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, LoggingConfig, RosterConfig, StorageBackend, StorageConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{
    GradeRange, InvalidGradeRange, Student, StudentId, StudentValidationError, UNASSIGNED_ID,
};
pub use repo::student_repo::{RepoError, RepoResult, StudentRepository};
pub use service::roster_service::{RosterService, StudentForm};
pub use store::{
    IdAuthority, JsonFileStore, PersistenceError, SqliteStore, StoreCause, StoreResult,
    StudentStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
