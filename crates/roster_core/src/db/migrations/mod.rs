//! Roster schema migrations.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order.
//! - All pending steps and the `user_version` bump commit together.
//! - `Students` is verified after every open, so a pre-existing table from an
//!   unversioned database is adopted only when its columns line up.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Columns `SqliteStore` reads and writes.
pub const STUDENT_COLUMNS: [&str; 5] = ["ID", "Name", "Age", "Grade", "Email"];

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "students_table",
    sql: include_str!("0001_students.sql"),
}];

/// Returns the newest schema version this build can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades `conn` to `latest_version()` and checks the `Students` layout.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::NewerSchema { found, supported });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if let Some(last) = pending.last() {
        let tx = conn.transaction()?;
        for step in &pending {
            tx.execute_batch(step.sql)?;
        }
        tx.pragma_update(None, "user_version", last.version)?;
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok from={} to={} steps={}",
            found,
            last.version,
            pending
                .iter()
                .map(|step| step.name)
                .collect::<Vec<_>>()
                .join(",")
        );
    }

    verify_students_table(conn)
}

fn verify_students_table(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('Students');")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let missing_columns: Vec<&'static str> = STUDENT_COLUMNS
        .iter()
        .copied()
        .filter(|column| !present.iter().any(|name| name.eq_ignore_ascii_case(column)))
        .collect();
    if missing_columns.is_empty() {
        Ok(())
    } else {
        Err(DbError::StudentsTableMismatch { missing_columns })
    }
}
