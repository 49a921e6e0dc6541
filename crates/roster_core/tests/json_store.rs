use roster_core::{
    IdAuthority, JsonFileStore, PersistenceError, Student, StoreCause, StudentStore,
};
use std::fs;

fn sample() -> Vec<Student> {
    vec![
        Student::new("Ann", 20, 4.0, "a@b.com").with_id(1),
        Student::new("Bob", 22, 3.5, "").with_id(4),
    ]
}

#[test]
fn missing_file_loads_empty_and_creates_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");
    let store = JsonFileStore::new(&path);

    assert!(store.load().is_empty());
    assert!(path.exists());

    let content = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[test]
fn save_then_load_roundtrips_field_by_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("students.json"));

    store.save(&sample()).unwrap();
    let first = store.load();
    assert_eq!(first, sample());

    store.save(&first).unwrap();
    assert_eq!(store.load(), first);
}

#[test]
fn save_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("students.json"));

    store.save(&sample()).unwrap();
    store.save(&sample()[..1]).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Ann");
}

#[test]
fn save_writes_indented_json_with_storage_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");
    let mut store = JsonFileStore::new(&path);

    store.save(&sample()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\n  {"), "expected indented output: {content}");
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value[0]["Id"], 1);
    assert_eq!(value[1]["Name"], "Bob");
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("students.json");
    let mut store = JsonFileStore::new(&path);

    store.save(&sample()).unwrap();
    assert!(path.exists());
}

#[test]
fn corrupt_file_degrades_to_empty_and_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");
    fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStore::new(&path);

    let err = store.try_load().unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::ReadFailure {
            cause: StoreCause::Json(_),
            ..
        }
    ));

    assert!(store.load().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn null_and_blank_documents_load_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.json");
    let store = JsonFileStore::new(&path);

    fs::write(&path, "null").unwrap();
    assert!(store.try_load().unwrap().is_empty());

    fs::write(&path, "  \n").unwrap();
    assert!(store.try_load().unwrap().is_empty());
}

#[test]
fn unwritable_target_reports_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();
    let mut store = JsonFileStore::new(blocker.join("students.json"));

    let err = store.save(&sample()).unwrap_err();
    assert!(matches!(err, PersistenceError::WriteFailure { .. }));
    assert!(err.to_string().contains("failed to write roster"));
}

#[test]
fn set_target_redirects_subsequent_calls_without_loading() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    let mut store = JsonFileStore::new(&first);
    store.save(&sample()).unwrap();

    store.set_target(second.clone());
    assert_eq!(store.target(), second.as_path());
    assert!(!second.exists());

    assert!(store.load().is_empty());
    assert_eq!(JsonFileStore::new(&first).load(), sample());
}

#[test]
fn json_store_leaves_ids_to_the_repository() {
    let mut store = JsonFileStore::default();
    assert_eq!(store.id_authority(), IdAuthority::Repository);
    assert!(matches!(
        store.allocate_id(),
        Err(PersistenceError::Unsupported { .. })
    ));
}
