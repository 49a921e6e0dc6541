//! Student repository over a pluggable `StudentStore`.
//!
//! # Invariants
//! - Mutations are write-then-commit: the next roster is persisted first and
//!   only replaces the in-memory roster once the store accepted it.
//! - `next_id` never decreases while the same target stays configured.
//! - Query operations return snapshots and never reorder the stored roster.

use crate::model::student::{GradeRange, Student, StudentId, StudentValidationError};
use crate::store::{IdAuthority, PersistenceError, StudentStore};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const FIRST_ID: StudentId = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by roster mutations.
#[derive(Debug)]
pub enum RepoError {
    /// Candidate broke a roster rule; nothing changed.
    Validation(StudentValidationError),
    /// Update target carries the unassigned sentinel id.
    InvalidId(StudentId),
    /// No committed record has this id.
    NotFound(StudentId),
    /// Storage rejected the write; nothing changed.
    Persistence(PersistenceError),
    /// The highest representable id is already taken.
    IdsExhausted,
}

impl RepoError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound(_) => "not_found",
            Self::Persistence(err) => err.code(),
            Self::IdsExhausted => "ids_exhausted",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidId(id) => {
                write!(f, "student id {id} is not assigned; add the student first")
            }
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::IdsExhausted => write!(f, "no student ids left to assign"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::InvalidId(_) | Self::NotFound(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for RepoError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Authoritative student roster.
///
/// Single-writer: callers sharing one repository across threads must hold a
/// lock around each mutating call so the in-memory change and its write are
/// observed together.
pub struct StudentRepository<S: StudentStore> {
    store: S,
    students: Vec<Student>,
    /// `None` once the stored maximum is `StudentId::MAX`.
    next_id: Option<StudentId>,
    grades: GradeRange,
}

impl<S: StudentStore> StudentRepository<S> {
    /// Loads the roster from `store` and seeds the id counter from it.
    ///
    /// Unreadable storage yields an empty roster instead of an error.
    pub fn open(store: S, grades: GradeRange) -> Self {
        let students = store.load();
        let next_id = next_id_after(&students);
        info!(
            "event=roster_open module=repo status=ok backend={} count={} next_id={}",
            store.backend_name(),
            students.len(),
            counter_label(next_id)
        );
        Self {
            store,
            students,
            next_id,
            grades,
        }
    }

    /// Validates `candidate`, assigns it a fresh id and commits it.
    ///
    /// Any id carried by `candidate` is ignored.
    pub fn add(&mut self, candidate: Student) -> RepoResult<Student> {
        self.check(&candidate, "add")?;

        let id = match self.store.id_authority() {
            IdAuthority::Repository => self
                .next_id
                .ok_or_else(|| self.rejected("add", RepoError::IdsExhausted))?,
            IdAuthority::Store => self.store.allocate_id().inspect_err(|err| {
                warn!(
                    "event=student_add module=repo status=error error_code={} error={}",
                    err.code(),
                    err
                )
            })?,
        };
        let student = candidate.with_id(id);

        let mut next = self.students.clone();
        next.push(student.clone());
        self.commit(next, "add")?;
        self.next_id = advance(self.next_id, id);

        info!("event=student_add module=repo status=ok id={id}");
        Ok(student)
    }

    /// Replaces every field except `id` of the record matching `candidate.id`.
    pub fn update(&mut self, candidate: Student) -> RepoResult<()> {
        if !candidate.is_assigned() {
            return Err(self.rejected("update", RepoError::InvalidId(candidate.id)));
        }
        let Some(index) = self.position(candidate.id) else {
            return Err(self.rejected("update", RepoError::NotFound(candidate.id)));
        };
        self.check(&candidate, "update")?;

        let id = candidate.id;
        let mut next = self.students.clone();
        next[index] = candidate;
        self.commit(next, "update")?;

        info!("event=student_update module=repo status=ok id={id}");
        Ok(())
    }

    /// Removes the record with `id`. Returns `false` without touching storage
    /// when no such record exists.
    pub fn delete(&mut self, id: StudentId) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=student_delete module=repo status=noop id={id}");
            return Ok(false);
        };

        let mut next = self.students.clone();
        next.remove(index);
        self.commit(next, "delete")?;

        info!("event=student_delete module=repo status=ok id={id}");
        Ok(true)
    }

    /// Snapshot of the roster in stored order.
    pub fn list_all(&self) -> Vec<Student> {
        self.students.clone()
    }

    /// Case-insensitive substring match on `name`.
    ///
    /// Blank `text` matches every record.
    pub fn search_by_name(&self, text: &str) -> Vec<Student> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_all();
        }

        self.students
            .iter()
            .filter(|student| student.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Snapshot ordered by ascending age; equal ages keep stored order.
    ///
    /// The stored order is left as is.
    pub fn sort_by_age(&self) -> Vec<Student> {
        let mut sorted = self.students.clone();
        sorted.sort_by_key(|student| student.age);
        sorted
    }

    pub fn exists(&self, id: StudentId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: StudentId) -> Option<Student> {
        self.students.iter().find(|student| student.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn grade_range(&self) -> GradeRange {
        self.grades
    }

    /// Id the repository counter would hand out next, `None` when exhausted.
    pub fn next_id(&self) -> Option<StudentId> {
        self.next_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Re-reads the current target, discarding in-memory state.
    ///
    /// The id counter keeps its value if it is already ahead of the stored
    /// maximum.
    pub fn reload(&mut self) {
        self.students = self.store.load();
        self.next_id = match (self.next_id, next_id_after(&self.students)) {
            (Some(current), Some(stored)) => Some(current.max(stored)),
            _ => None,
        };
        info!(
            "event=roster_reload module=repo status=ok count={} next_id={}",
            self.students.len(),
            counter_label(self.next_id)
        );
    }

    /// Points the store at `target` and loads the roster found there.
    ///
    /// The id counter is re-seeded from the new roster.
    pub fn set_target(&mut self, target: impl Into<PathBuf>) {
        self.store.set_target(target.into());
        self.students = self.store.load();
        self.next_id = next_id_after(&self.students);
        info!(
            "event=roster_retarget module=repo status=ok backend={} count={} next_id={}",
            self.store.backend_name(),
            self.students.len(),
            counter_label(self.next_id)
        );
    }

    fn position(&self, id: StudentId) -> Option<usize> {
        self.students.iter().position(|student| student.id == id)
    }

    fn check(&self, candidate: &Student, op: &str) -> RepoResult<()> {
        candidate
            .validate(&self.grades)
            .map_err(|err| self.rejected(op, err.into()))
    }

    fn commit(&mut self, next: Vec<Student>, op: &str) -> RepoResult<()> {
        if let Err(err) = self.store.save(&next) {
            return Err(self.rejected(op, err.into()));
        }
        self.students = next;
        Ok(())
    }

    fn rejected(&self, op: &str, err: RepoError) -> RepoError {
        match &err {
            RepoError::Persistence(_) => warn!(
                "event=student_{op} module=repo status=error error_code={} error={}",
                err.code(),
                err
            ),
            _ => debug!(
                "event=student_{op} module=repo status=rejected error_code={}",
                err.code()
            ),
        }
        err
    }
}

fn next_id_after(students: &[Student]) -> Option<StudentId> {
    match students.iter().map(|student| student.id).max() {
        Some(max) => max.max(0).checked_add(1),
        None => Some(FIRST_ID),
    }
}

// Counter after `used` was handed out; store-assigned ids may run ahead of it.
fn advance(current: Option<StudentId>, used: StudentId) -> Option<StudentId> {
    let after = used.checked_add(1)?;
    Some(current.map_or(after, |current| current.max(after)))
}

fn counter_label(next_id: Option<StudentId>) -> String {
    next_id.map_or_else(|| "exhausted".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::{advance, next_id_after};
    use crate::model::student::Student;

    #[test]
    fn next_id_starts_at_one_for_empty_roster() {
        assert_eq!(next_id_after(&[]), Some(1));
    }

    #[test]
    fn next_id_follows_highest_stored_id() {
        let students = vec![
            Student::new("a", 1, 3.0, "").with_id(7),
            Student::new("b", 1, 3.0, "").with_id(2),
        ];
        assert_eq!(next_id_after(&students), Some(8));
    }

    #[test]
    fn counter_is_exhausted_at_max_id() {
        let students = vec![Student::new("a", 1, 3.0, "").with_id(i64::MAX)];
        assert_eq!(next_id_after(&students), None);
        assert_eq!(advance(Some(5), i64::MAX), None);
        assert_eq!(advance(Some(9), 3), Some(9));
        assert_eq!(advance(None, 3), Some(4));
    }
}
