//! Student roster domain model.
//!
//! # Responsibility
//! - Define the canonical student record shared by repository and stores.
//! - Own the validation rules applied before a record enters the roster.
//!
//! # Invariants
//! - Every committed record carries a repository- or store-assigned `StudentId`.
//! - Validation is explicit (`Student::validate`), never performed by
//!   constructors or deserialization.

pub mod student;
