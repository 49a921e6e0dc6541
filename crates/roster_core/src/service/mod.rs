//! Roster use-case services.
//!
//! # Responsibility
//! - Turn raw form input into repository calls.
//! - Keep presentation layers free of parsing and storage details.

pub mod roster_service;
