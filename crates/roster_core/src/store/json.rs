//! JSON document store.
//!
//! The roster is a single pretty-printed JSON array of student objects.
//!
//! # Invariants
//! - A missing target is created as `[]` on first load.
//! - Writes go to a temporary sibling first and are renamed over the target,
//!   so readers never observe a half-written document.
//! - A target that fails to parse is left untouched on load.

use super::{PersistenceError, StoreResult, StudentStore};
use crate::model::student::Student;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_JSON_FILE: &str = "students.json";

/// Roster store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_document(&self, students: &[Student]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(students)
            .map_err(|err| PersistenceError::write(&self.path, err))?;
        write_atomically(&self.path, content.as_bytes())
            .map_err(|err| PersistenceError::write(&self.path, err))
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_JSON_FILE)
    }
}

impl StudentStore for JsonFileStore {
    fn try_load(&self) -> StoreResult<Vec<Student>> {
        if !self.path.exists() {
            match self.write_document(&[]) {
                Ok(()) => info!(
                    "event=store_init module=store backend=json status=ok path={}",
                    self.path.display()
                ),
                Err(err) => warn!(
                    "event=store_init module=store backend=json status=error error_code={} error={}",
                    err.code(),
                    err
                ),
            }
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|err| PersistenceError::read(&self.path, err))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        // A literal `null` document is treated as an empty roster.
        let students: Option<Vec<Student>> = serde_json::from_str(&content)
            .map_err(|err| PersistenceError::read(&self.path, err))?;
        let students = students.unwrap_or_default();

        debug!(
            "event=store_load module=store backend=json status=ok count={}",
            students.len()
        );
        Ok(students)
    }

    fn save(&mut self, students: &[Student]) -> StoreResult<()> {
        if let Err(err) = self.write_document(students) {
            warn!(
                "event=store_save module=store backend=json status=error error_code={} error={}",
                err.code(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=store_save module=store backend=json status=ok count={}",
            students.len()
        );
        Ok(())
    }

    fn set_target(&mut self, target: PathBuf) {
        self.path = target;
    }

    fn target(&self) -> &Path {
        &self.path
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.exists() {
        fs::create_dir_all(&parent)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_JSON_FILE.to_string());
    let tmp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    fs::write(&tmp_path, content)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_atomically;

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("roster.json");

        write_atomically(&path, b"[]").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
