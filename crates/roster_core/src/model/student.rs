//! Student domain model.
//!
//! # Responsibility
//! - Define the student record and its persisted field names.
//! - Provide the single validation entry point used at the repository boundary.
//!
//! # Invariants
//! - `id == UNASSIGNED_ID` means the record has never been committed.
//! - Construction and deserialization never validate; loaded data is trusted.
//! - Matching between records is by `id` (`same_id`); `PartialEq` is structural.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier assigned to a student when it is committed to the roster.
pub type StudentId = i64;

/// Sentinel id carried by candidates that were never committed.
pub const UNASSIGNED_ID: StudentId = 0;

/// Closed interval of accepted grade values.
///
/// Grading scales differ between deployments, so the bound is carried as
/// configuration instead of being fixed in the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: f64,
    pub max: f64,
}

impl GradeRange {
    /// Five-point scale, `[2, 5]`.
    pub const FIVE_POINT: GradeRange = GradeRange { min: 2.0, max: 5.0 };
    /// Ten-point scale, `[0, 10]`.
    pub const TEN_POINT: GradeRange = GradeRange { min: 0.0, max: 10.0 };

    /// Creates a range after checking that both bounds are finite and ordered.
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidGradeRange> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(InvalidGradeRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns whether `grade` lies within the closed interval.
    ///
    /// `NaN` is never contained.
    pub fn contains(&self, grade: f64) -> bool {
        grade >= self.min && grade <= self.max
    }
}

impl Default for GradeRange {
    fn default() -> Self {
        Self::FIVE_POINT
    }
}

impl Display for GradeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Rejected grade range bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidGradeRange {
    pub min: f64,
    pub max: f64,
}

impl Display for InvalidGradeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid grade range: min ({}) and max ({}) must be finite with min <= max",
            self.min, self.max
        )
    }
}

impl Error for InvalidGradeRange {}

/// Rule violated by a student candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentValidationError {
    /// Name is empty or whitespace-only.
    EmptyName,
    /// Age is zero or negative.
    NonPositiveAge { age: i32 },
    /// Grade lies outside the configured range.
    GradeOutOfRange { grade: f64, range: GradeRange },
    /// Email is non-empty but has no `@`.
    MalformedEmail { email: String },
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::NonPositiveAge { age } => {
                write!(f, "age must be a positive number, got {age}")
            }
            Self::GradeOutOfRange { grade, range } => write!(
                f,
                "grade must be between {} and {}, got {grade}",
                range.min, range.max
            ),
            Self::MalformedEmail { email } => {
                write!(f, "email `{email}` must contain `@`")
            }
        }
    }
}

impl Error for StudentValidationError {}

/// One roster entry.
///
/// Field names on the wire follow the storage format (`Id`, `Name`, `Age`,
/// `Grade`, `Email`); lower-case keys are accepted on read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    #[serde(rename = "Id", alias = "id", alias = "ID")]
    pub id: StudentId,
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Age", alias = "age")]
    pub age: i32,
    #[serde(rename = "Grade", alias = "grade")]
    pub grade: f64,
    #[serde(rename = "Email", alias = "email")]
    pub email: String,
}

impl Student {
    /// Creates an uncommitted candidate. No validation is performed.
    pub fn new(name: impl Into<String>, age: i32, grade: f64, email: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            age,
            grade,
            email: email.into(),
        }
    }

    /// Returns the same candidate with `id` replaced.
    pub fn with_id(mut self, id: StudentId) -> Self {
        self.id = id;
        self
    }

    /// Returns whether the record has been committed and carries a real id.
    pub fn is_assigned(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Identity match used by update/delete lookups.
    pub fn same_id(&self, other: &Student) -> bool {
        self.id == other.id
    }

    /// Checks every roster rule and reports the first violation.
    ///
    /// Rules are checked in a fixed order: name, age, grade, email. `id` is
    /// not inspected.
    pub fn validate(&self, grades: &GradeRange) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        if self.age <= 0 {
            return Err(StudentValidationError::NonPositiveAge { age: self.age });
        }
        if !grades.contains(self.grade) {
            return Err(StudentValidationError::GradeOutOfRange {
                grade: self.grade,
                range: *grades,
            });
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(StudentValidationError::MalformedEmail {
                email: self.email.clone(),
            });
        }
        Ok(())
    }
}
