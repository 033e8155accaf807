//! A gradable item within one course.

use std::collections::HashMap;

use crate::course::Course;
use crate::error::{GradebookError, Result};
use crate::grade::Grade;
use crate::student::{AssignmentKey, Person, Student, StudentId};

/// An assignment and the grades recorded for it.
///
/// The owning course is fixed at construction. Grades are only written
/// through [`Course::assign_grade`], which keeps the student's own record in
/// step and notifies the course's observers.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    title: String,
    max_points: f64,
    course: String,
    grades: HashMap<StudentId, Grade>,
}

impl Assignment {
    pub fn new(title: impl Into<String>, max_points: f64, course: &Course) -> Result<Self> {
        if !(max_points > 0.0 && max_points.is_finite()) {
            return Err(GradebookError::InvalidMaxPoints(max_points));
        }
        Ok(Self {
            title: title.into(),
            max_points,
            course: course.name().to_string(),
            grades: HashMap::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    /// Name of the course this assignment belongs to.
    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn key(&self) -> AssignmentKey {
        AssignmentKey::new(&self.course, &self.title)
    }

    /// The student's grade, or `None` if they have not been graded yet.
    pub fn grade(&self, student: &StudentId) -> Option<&Grade> {
        self.grades.get(student)
    }

    pub fn grades(&self) -> &HashMap<StudentId, Grade> {
        &self.grades
    }

    pub fn is_graded(&self, student: &StudentId) -> bool {
        self.grades.contains_key(student)
    }

    /// `true` when every listed student has a grade.
    pub fn is_fully_graded(&self, students: &[Person]) -> bool {
        students.iter().all(|p| self.grades.contains_key(&p.id))
    }

    /// Record a grade, overwriting any earlier one, and mirror it into the
    /// student's record. Nothing is written if validation fails.
    pub(crate) fn assign_grade(&mut self, student: &mut Student, points: f64) -> Result<Grade> {
        if points > self.max_points {
            return Err(GradebookError::PointsExceedMaximum {
                points,
                max_points: self.max_points,
            });
        }
        let grade = Grade::new(points, self.max_points)?;
        student.record_grade(self.key(), grade);
        self.grades.insert(student.id().clone(), grade);
        Ok(grade)
    }
}
