//! SQLite table store.
//!
//! # Responsibility
//! - Persist the roster into the `Students` table.
//! - Hand out ids from the table's AUTOINCREMENT sequence.
//!
//! # Invariants
//! - `save` rewrites the table inside one transaction.
//! - Ids come from `sqlite_sequence`, which never decreases, so deleted ids
//!   are not reused across restarts.
//! - File targets are opened per call; the `:memory:` target keeps one
//!   connection, opened on first use, until the store is retargeted.

use super::{IdAuthority, PersistenceError, StoreResult, StudentStore};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::student::{Student, StudentId};
use log::{debug, warn};
use once_cell::unsync::OnceCell;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

pub const DEFAULT_SQLITE_FILE: &str = "students.db";

const MEMORY_TARGET: &str = ":memory:";

const STUDENT_SELECT_SQL: &str = "SELECT ID, Name, Age, Grade, Email FROM Students ORDER BY ID ASC;";

const NEXT_ID_SQL: &str = "SELECT MAX(
    COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'Students'), 0),
    COALESCE((SELECT MAX(ID) FROM Students), 0)
) + 1;";

enum SqliteTarget {
    File(PathBuf),
    Memory {
        path: PathBuf,
        conn: OnceCell<Connection>,
    },
}

impl SqliteTarget {
    fn for_path(path: PathBuf) -> Self {
        if path.as_os_str() == MEMORY_TARGET {
            Self::Memory {
                path,
                conn: OnceCell::new(),
            }
        } else {
            Self::File(path)
        }
    }
}

/// Roster store backed by a SQLite database.
pub struct SqliteStore {
    target: SqliteTarget,
}

impl SqliteStore {
    /// Creates a store for a database file, created on first use.
    ///
    /// The path `:memory:` selects a private in-memory database instead.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            target: SqliteTarget::for_path(path.into()),
        }
    }

    /// Creates a store over a private in-memory database, opened eagerly.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self {
            target: SqliteTarget::Memory {
                path: PathBuf::from(MEMORY_TARGET),
                conn: OnceCell::from(open_db_in_memory()?),
            },
        })
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> DbResult<T> {
        match &self.target {
            SqliteTarget::File(path) => {
                let conn = open_db(path.as_path())?;
                Ok(op(&conn)?)
            }
            SqliteTarget::Memory { conn, .. } => {
                let conn = conn.get_or_try_init(open_db_in_memory)?;
                Ok(op(conn)?)
            }
        }
    }
}

impl Default for SqliteStore {
    fn default() -> Self {
        Self::new(DEFAULT_SQLITE_FILE)
    }
}

impl StudentStore for SqliteStore {
    fn try_load(&self) -> StoreResult<Vec<Student>> {
        let students = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare(STUDENT_SELECT_SQL)?;
                let rows = stmt.query_map([], parse_student_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(|err| PersistenceError::read(self.target(), err))?;

        debug!(
            "event=store_load module=store backend=sqlite status=ok count={}",
            students.len()
        );
        Ok(students)
    }

    fn save(&mut self, students: &[Student]) -> StoreResult<()> {
        let result = self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM Students;", [])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO Students (ID, Name, Age, Grade, Email)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                )?;
                for student in students {
                    insert.execute(params![
                        student.id,
                        student.name.as_str(),
                        student.age,
                        student.grade,
                        student.email.as_str(),
                    ])?;
                }
            }
            tx.commit()
        });

        match result {
            Ok(()) => {
                debug!(
                    "event=store_save module=store backend=sqlite status=ok count={}",
                    students.len()
                );
                Ok(())
            }
            Err(err) => {
                let err = PersistenceError::write(self.target(), err);
                warn!(
                    "event=store_save module=store backend=sqlite status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn set_target(&mut self, target: PathBuf) {
        self.target = SqliteTarget::for_path(target);
    }

    fn target(&self) -> &Path {
        match &self.target {
            SqliteTarget::File(path) => path.as_path(),
            SqliteTarget::Memory { path, .. } => path.as_path(),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn id_authority(&self) -> IdAuthority {
        IdAuthority::Store
    }

    fn allocate_id(&mut self) -> StoreResult<StudentId> {
        self.with_conn(|conn| conn.query_row(NEXT_ID_SQL, [], |row| row.get::<_, StudentId>(0)))
            .map_err(|err| PersistenceError::read(self.target(), err))
    }
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("ID")?,
        name: row.get("Name")?,
        age: row.get::<_, Option<i32>>("Age")?.unwrap_or_default(),
        grade: row.get::<_, Option<f64>>("Grade")?.unwrap_or_default(),
        email: row.get::<_, Option<String>>("Email")?.unwrap_or_default(),
    })
}
