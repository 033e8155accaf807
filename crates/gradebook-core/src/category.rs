//! Weighted buckets of assignments with a "drop lowest N" policy.

use crate::assignment::Assignment;
use crate::calculator;
use crate::error::{GradebookError, Result};
use crate::grade::Grade;
use crate::student::StudentId;

/// A named, weighted group of assignments (e.g. "Homework" at 0.25).
///
/// A category lists assignments by title; the titles are resolved against
/// the owning course's assignments whenever an average is computed, so an
/// assignment removed from the course stops counting immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: String,
    weight: f64,
    assignments: Vec<String>,
    drop_lowest_count: usize,
}

impl Category {
    /// `weight` is a fraction in `[0, 1]`.
    pub fn new(name: impl Into<String>, weight: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(GradebookError::InvalidWeight(weight));
        }
        Ok(Self {
            name: name.into(),
            weight,
            assignments: Vec::new(),
            drop_lowest_count: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn drop_lowest_count(&self) -> usize {
        self.drop_lowest_count
    }

    /// Set the drop count directly. Once the category is attached to a
    /// course, use [`Course::set_drop_lowest_count`](crate::course::Course::set_drop_lowest_count)
    /// so observers are notified.
    pub fn set_drop_lowest_count(&mut self, count: usize) {
        self.drop_lowest_count = count;
    }

    /// Add an assignment by title. Returns `false` if it is already listed.
    pub fn add_assignment(&mut self, assignment: &Assignment) -> bool {
        self.add_title(assignment.title())
    }

    /// Titles of the assignments in this category, in insertion order.
    pub fn assignments(&self) -> &[String] {
        &self.assignments
    }

    pub fn contains(&self, title: &str) -> bool {
        self.assignments.iter().any(|t| t == title)
    }

    /// The student's grades in this category, in category order. Ungraded
    /// assignments are skipped, not counted as zero.
    pub fn student_grades(&self, student: &StudentId, assignments: &[Assignment]) -> Vec<Grade> {
        self.graded_entries(student, assignments)
            .into_iter()
            .map(|(_, grade)| grade)
            .collect()
    }

    /// Mean percentage of the grades that survive the drop rule, before the
    /// category weight is applied. 0.0 if nothing survives.
    pub fn unweighted_average(&self, student: &StudentId, assignments: &[Assignment]) -> f64 {
        let kept = calculator::drop_lowest_grades(
            &self.student_grades(student, assignments),
            self.drop_lowest_count,
        );
        calculator::calculate_average(&kept)
    }

    /// The student's category average multiplied by the category weight.
    pub fn calculate_category_average(
        &self,
        student: &StudentId,
        assignments: &[Assignment],
    ) -> f64 {
        self.unweighted_average(student, assignments) * self.weight
    }

    /// Whether the student's grade on `title` is one of the dropped lowest.
    ///
    /// Uses the same stable ascending sort as the averages: among equal
    /// percentages, the assignment listed earlier in the category is dropped
    /// first.
    pub fn is_dropped(&self, title: &str, student: &StudentId, assignments: &[Assignment]) -> bool {
        let mut entries = self.graded_entries(student, assignments);
        entries.sort_by(|a, b| a.1.percentage().total_cmp(&b.1.percentage()));
        let to_drop = self.drop_lowest_count.min(entries.len());
        entries[..to_drop].iter().any(|(t, _)| *t == title)
    }

    pub(crate) fn add_title(&mut self, title: &str) -> bool {
        if self.contains(title) {
            return false;
        }
        self.assignments.push(title.to_string());
        true
    }

    pub(crate) fn remove_title(&mut self, title: &str) -> bool {
        let before = self.assignments.len();
        self.assignments.retain(|t| t != title);
        self.assignments.len() != before
    }

    fn graded_entries<'a>(
        &'a self,
        student: &StudentId,
        assignments: &[Assignment],
    ) -> Vec<(&'a str, Grade)> {
        self.assignments
            .iter()
            .filter_map(|title| {
                let assignment = assignments.iter().find(|a| a.title() == title)?;
                let grade = assignment.grade(student)?;
                Some((title.as_str(), *grade))
            })
            .collect()
    }
}
