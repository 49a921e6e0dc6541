use roster_core::db::migrations::latest_version;
use roster_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "Students");
}

#[test]
fn students_table_matches_storage_layout() {
    let conn = open_db_in_memory().unwrap();

    let mut stmt = conn.prepare("PRAGMA table_info(Students);").unwrap();
    let columns: Vec<(String, String, i64, i64)> = stmt
        .query_map([], |row| {
            Ok((row.get(1)?, row.get(2)?, row.get(3)?, row.get(5)?))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        columns,
        vec![
            ("ID".to_string(), "INTEGER".to_string(), 0, 1),
            ("Name".to_string(), "TEXT".to_string(), 1, 0),
            ("Age".to_string(), "INTEGER".to_string(), 0, 0),
            ("Grade".to_string(), "REAL".to_string(), 0, 0),
            ("Email".to_string(), "TEXT".to_string(), 0, 0),
        ]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO Students (Name, Age, Grade, Email) VALUES ('Ann', 20, 4, '');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM Students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::NewerSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unversioned_students_table_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Students (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL,
            Age INTEGER,
            Grade REAL,
            Email TEXT
        );
        INSERT INTO Students (Name, Age, Grade, Email) VALUES ('Ann', 20, 4, 'a@b.com');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let name: String = conn
        .query_row("SELECT Name FROM Students WHERE ID = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Ann");
}

#[test]
fn foreign_students_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE Students (ID INTEGER PRIMARY KEY, FullName TEXT);")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::StudentsTableMismatch { missing_columns } => {
            assert_eq!(missing_columns, vec!["Name", "Age", "Grade", "Email"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
