//! gradebook-core: grade aggregation engine, course model, and reports.
//!
//! Courses own their assignments and categories and compute student
//! averages on demand under either total-points or weighted grading.
//! [`model::GradebookModel`] holds every student, teacher, and course, and
//! [`parser`] moves courses in and out of TOML course files.

pub mod assignment;
pub mod calculator;
pub mod category;
pub mod config;
pub mod course;
pub mod error;
pub mod grade;
pub mod model;
pub mod observer;
pub mod parser;
pub mod report;
pub mod student;

pub use assignment::Assignment;
pub use category::Category;
pub use course::{Course, GradingMode};
pub use error::{GradebookError, Result};
pub use grade::{FinalGrade, Grade};
pub use model::GradebookModel;
pub use observer::{Observer, ObserverHandle};
pub use student::{AssignmentKey, Person, Student, StudentId, Teacher};
