//! Form-driven roster service.
//!
//! # Responsibility
//! - Convert text form fields into student candidates.
//! - Delegate every mutation to `StudentRepository` unchanged.
//!
//! # Invariants
//! - Unparseable age/grade text becomes `0` and is rejected by validation.
//! - Email input is trimmed before it reaches the repository.

use crate::model::student::{Student, StudentId, UNASSIGNED_ID};
use crate::repo::student_repo::{RepoResult, StudentRepository};
use crate::store::StudentStore;
use std::path::PathBuf;

/// Raw text captured by an add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    /// `UNASSIGNED_ID` while adding; the edited record's id while updating.
    pub id: StudentId,
    pub name: String,
    pub age_text: String,
    pub grade_text: String,
    pub email: String,
}

impl StudentForm {
    /// Prefills a form from a committed record, as an edit dialog does.
    pub fn from_student(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            age_text: display_number(student.age),
            grade_text: display_number(student.grade),
            email: student.email.clone(),
        }
    }

    /// Builds the candidate record the form describes. Performs no validation.
    pub fn to_candidate(&self) -> Student {
        Student {
            id: self.id,
            name: self.name.clone(),
            age: parse_or_zero(&self.age_text),
            grade: parse_or_zero(&self.grade_text),
            email: self.email.trim().to_string(),
        }
    }
}

/// Use-case wrapper around a roster repository.
pub struct RosterService<S: StudentStore> {
    repo: StudentRepository<S>,
}

impl<S: StudentStore> RosterService<S> {
    pub fn new(repo: StudentRepository<S>) -> Self {
        Self { repo }
    }

    /// Adds the student described by `form`; the form id is ignored.
    pub fn add_from_form(&mut self, form: &StudentForm) -> RepoResult<Student> {
        self.repo.add(form.to_candidate().with_id(UNASSIGNED_ID))
    }

    /// Saves edits for the record the form was opened on.
    ///
    /// A form never opened on a record carries `UNASSIGNED_ID` and is
    /// rejected by the repository as `RepoError::InvalidId`.
    pub fn update_from_form(&mut self, form: &StudentForm) -> RepoResult<()> {
        self.repo.update(form.to_candidate())
    }

    pub fn delete(&mut self, id: StudentId) -> RepoResult<bool> {
        self.repo.delete(id)
    }

    /// Name search with surrounding whitespace ignored.
    pub fn search(&self, query: &str) -> Vec<Student> {
        self.repo.search_by_name(query.trim())
    }

    pub fn sorted_by_age(&self) -> Vec<Student> {
        self.repo.sort_by_age()
    }

    /// Clears any filtered view by re-reading storage and returning the full roster.
    pub fn refresh(&mut self) -> Vec<Student> {
        self.repo.reload();
        self.repo.list_all()
    }

    /// Switches to another roster file and returns its contents.
    ///
    /// Blank paths are ignored and the current roster is returned.
    pub fn open_target(&mut self, path: &str) -> Vec<Student> {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            self.repo.set_target(PathBuf::from(trimmed));
        }
        self.repo.list_all()
    }

    pub fn repository(&self) -> &StudentRepository<S> {
        &self.repo
    }

    pub fn into_repository(self) -> StudentRepository<S> {
        self.repo
    }
}

fn parse_or_zero<T: std::str::FromStr + Default>(text: &str) -> T {
    text.trim().parse().unwrap_or_default()
}

// Zero reads as an empty field.
fn display_number<T: PartialEq + Default + ToString>(value: T) -> String {
    if value == T::default() {
        String::new()
    } else {
        value.to_string()
    }
}
