//! Gradebook error types.
//!
//! Every fallible operation on the course model reports one of these.
//! Lookups that merely miss (unknown username, unknown course name) return
//! `Option` instead; these variants are for mutations that cannot proceed.

use thiserror::Error;

/// Errors raised by the grade-aggregation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradebookError {
    /// A grade with points outside `[0, max_points]` or a non-positive maximum.
    #[error("invalid grade: {points} out of {max_points}")]
    InvalidGrade { points: f64, max_points: f64 },

    /// Points awarded on an assignment exceed the assignment's maximum.
    #[error("points exceed maximum: {points} > {max_points}")]
    PointsExceedMaximum { points: f64, max_points: f64 },

    /// An assignment was declared with a non-positive or non-finite maximum.
    #[error("assignment max points must be positive, got {0}")]
    InvalidMaxPoints(f64),

    /// A category weight outside `[0, 1]`.
    #[error("category weight must be between 0 and 1, got {0}")]
    InvalidWeight(f64),

    /// The course has no assignment with this title.
    #[error("unknown assignment: {0}")]
    UnknownAssignment(String),

    /// The course has no category with this name.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// No course is registered under this name.
    #[error("unknown course: {0}")]
    UnknownCourse(String),

    /// No student is registered under this username.
    #[error("unknown student: {0}")]
    UnknownStudent(String),

    /// No teacher is registered under this username.
    #[error("unknown teacher: {0}")]
    UnknownTeacher(String),

    /// The student is not enrolled in the course being mutated.
    #[error("student {student} is not enrolled in {course}")]
    NotEnrolled { student: String, course: String },

    /// A course with this name already exists.
    #[error("course already exists: {0}")]
    DuplicateCourse(String),
}

impl GradebookError {
    /// Returns `true` if the error came from rejecting a value (as opposed to
    /// a key that does not resolve).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GradebookError::InvalidGrade { .. }
                | GradebookError::PointsExceedMaximum { .. }
                | GradebookError::InvalidMaxPoints(_)
                | GradebookError::InvalidWeight(_)
        )
    }
}

/// Convenience alias used across the core crate.
pub type Result<T> = std::result::Result<T, GradebookError>;
