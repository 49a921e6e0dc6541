//! Roster repository.
//!
//! # Responsibility
//! - Own the authoritative in-memory roster and the id counter.
//! - Apply validation before any record is committed.
//! - Persist the full roster after every successful mutation.
//!
//! # Invariants
//! - Committed ids are pairwise distinct and never handed out twice.
//! - In-memory roster and storage agree after every successful mutation;
//!   a failed write leaves both untouched.

pub mod student_repo;
