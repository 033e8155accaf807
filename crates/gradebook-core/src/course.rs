//! Courses: enrollment, assignments, categories, averages, and final grades.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assignment::Assignment;
use crate::calculator;
use crate::category::Category;
use crate::error::{GradebookError, Result};
use crate::grade::{FinalGrade, Grade};
use crate::observer::{Observer, ObserverHandle, ObserverList};
use crate::student::{Person, Student, StudentId};

/// Slack allowed when checking that category weights sum to at most 1.0,
/// so that e.g. 0.1 + 0.2 + 0.7 is accepted.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Category names match regardless of case, Unicode included.
fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// How a course turns assignment grades into a student average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMode {
    /// Earned points over possible points across all categories.
    #[default]
    TotalPoints,
    /// Sum of weight-multiplied category averages.
    Weighted,
}

impl fmt::Display for GradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingMode::TotalPoints => write!(f, "total_points"),
            GradingMode::Weighted => write!(f, "weighted"),
        }
    }
}

impl FromStr for GradingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "total_points" | "points" | "total" => Ok(GradingMode::TotalPoints),
            "weighted" => Ok(GradingMode::Weighted),
            other => Err(format!("unknown grading mode: {other}")),
        }
    }
}

/// A course and everything graded in it.
///
/// Every mutation notifies the registered observers before returning.
/// Averages are never cached; each query walks the current grades.
#[derive(Debug)]
pub struct Course {
    name: String,
    students: Vec<Person>,
    assignments: Vec<Assignment>,
    categories: Vec<Category>,
    final_grades: HashMap<StudentId, FinalGrade>,
    grading_mode: GradingMode,
    assignments_to_drop: usize,
    observers: ObserverList,
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            students: Vec::new(),
            assignments: Vec::new(),
            categories: Vec::new(),
            final_grades: HashMap::new(),
            grading_mode: GradingMode::default(),
            assignments_to_drop: 0,
            observers: ObserverList::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: Rc<dyn Observer>) -> ObserverHandle {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        self.observers.unsubscribe(handle)
    }

    pub fn notify_observers(&self) {
        self.observers.notify();
    }

    // -----------------------------------------------------------------------
    // Enrollment
    // -----------------------------------------------------------------------

    /// Enroll a student, linking the course into the student's record too.
    /// Returns `false` if the student was already enrolled.
    pub fn add_student(&mut self, student: &mut Student) -> bool {
        if self.is_enrolled(student.id()) {
            return false;
        }
        self.students.push(student.person().clone());
        student.add_course(&self.name);
        debug!(course = %self.name, student = %student.id(), "student enrolled");
        self.notify_observers();
        true
    }

    /// Withdraw a student from both sides of the enrollment. Any final grade
    /// recorded for this course is cleared on both sides as well.
    pub fn remove_student(&mut self, student: &mut Student) -> bool {
        let before = self.students.len();
        self.students.retain(|p| p.id != *student.id());
        let removed = self.students.len() != before;
        student.remove_course(&self.name);
        if removed {
            self.final_grades.remove(student.id());
            student.clear_final_grade(&self.name);
            debug!(course = %self.name, student = %student.id(), "student withdrawn");
            self.notify_observers();
        }
        removed
    }

    pub fn is_enrolled(&self, student: &StudentId) -> bool {
        self.students.iter().any(|p| p.id == *student)
    }

    /// Enrolled students in enrollment order.
    pub fn students(&self) -> &[Person] {
        &self.students
    }

    // -----------------------------------------------------------------------
    // Assignments
    // -----------------------------------------------------------------------

    /// Returns `false` if an assignment with the same title already exists
    /// or the assignment was created for another course.
    pub fn add_assignment(&mut self, assignment: Assignment) -> bool {
        if assignment.course() != self.name {
            warn!(
                course = %self.name,
                owner = assignment.course(),
                title = assignment.title(),
                "rejected assignment from another course"
            );
            return false;
        }
        if self.assignment(assignment.title()).is_some() {
            return false;
        }
        debug!(course = %self.name, title = assignment.title(), "assignment added");
        self.assignments.push(assignment);
        self.notify_observers();
        true
    }

    /// Remove an assignment and take it out of every category.
    ///
    /// Student records keep their copy of its grades; go through
    /// [`GradebookModel::remove_assignment`](crate::model::GradebookModel::remove_assignment)
    /// to clear those as well.
    pub fn remove_assignment(&mut self, title: &str) -> bool {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.title() != title);
        if self.assignments.len() == before {
            return false;
        }
        for category in &mut self.categories {
            category.remove_title(title);
        }
        debug!(course = %self.name, title, "assignment removed");
        self.notify_observers();
        true
    }

    pub fn assignment(&self, title: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.title() == title)
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Grade an enrolled student on one of this course's assignments.
    ///
    /// The grade is mirrored into the student's record. On any error nothing
    /// changes and observers are not notified.
    pub fn assign_grade(&mut self, title: &str, student: &mut Student, points: f64) -> Result<Grade> {
        if !self.is_enrolled(student.id()) {
            return Err(GradebookError::NotEnrolled {
                student: student.username().to_string(),
                course: self.name.clone(),
            });
        }
        let assignment = self
            .assignments
            .iter_mut()
            .find(|a| a.title() == title)
            .ok_or_else(|| GradebookError::UnknownAssignment(title.to_string()))?;
        let grade = assignment.assign_grade(student, points)?;
        debug!(
            course = %self.name,
            title,
            student = %student.id(),
            points,
            "grade assigned"
        );
        self.notify_observers();
        Ok(grade)
    }

    /// Assignments some enrolled student has not been graded on yet.
    pub fn ungraded_assignments(&self) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| !a.is_fully_graded(&self.students))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Attach a category unless that would push the total weight over 1.0.
    /// Returns `false`, leaving the course untouched, when it would.
    pub fn add_category(&mut self, category: Category) -> bool {
        let current: f64 = self.categories.iter().map(Category::weight).sum();
        if current + category.weight() > 1.0 + WEIGHT_EPSILON {
            warn!(
                course = %self.name,
                category = category.name(),
                current,
                weight = category.weight(),
                "category rejected: weights would exceed 1.0"
            );
            return false;
        }
        debug!(course = %self.name, category = category.name(), "category added");
        self.categories.push(category);
        self.notify_observers();
        true
    }

    /// Remove every category whose name matches, ignoring case.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| !same_name(c.name(), name));
        let removed = self.categories.len() != before;
        if removed {
            debug!(course = %self.name, category = name, "category removed");
            self.notify_observers();
        }
        removed
    }

    /// Case-insensitive lookup.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| same_name(c.name(), name))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Put an existing course assignment into a category.
    /// Returns `Ok(false)` if it was already there.
    pub fn categorize(&mut self, category: &str, title: &str) -> Result<bool> {
        if self.assignment(title).is_none() {
            return Err(GradebookError::UnknownAssignment(title.to_string()));
        }
        let target = self.category_mut(category)?;
        let added = target.add_title(title);
        if added {
            debug!(course = %self.name, category, title, "assignment categorized");
            self.notify_observers();
        }
        Ok(added)
    }

    /// Change how many of a category's lowest grades are dropped.
    pub fn set_drop_lowest_count(&mut self, category: &str, count: usize) -> Result<()> {
        self.category_mut(category)?.set_drop_lowest_count(count);
        debug!(course = %self.name, category, count, "drop count changed");
        self.notify_observers();
        Ok(())
    }

    fn category_mut(&mut self, name: &str) -> Result<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| same_name(c.name(), name))
            .ok_or_else(|| GradebookError::UnknownCategory(name.to_string()))
    }

    // -----------------------------------------------------------------------
    // Grading mode
    // -----------------------------------------------------------------------

    pub fn grading_mode(&self) -> GradingMode {
        self.grading_mode
    }

    pub fn set_grading_mode(&mut self, mode: GradingMode) {
        self.grading_mode = mode;
        self.notify_observers();
    }

    /// Course-wide drop count. Stored and persisted, but neither grading
    /// mode reads it: drops come from each category's own count.
    pub fn assignments_to_drop(&self) -> usize {
        self.assignments_to_drop
    }

    pub fn set_assignments_to_drop(&mut self, count: usize) {
        self.assignments_to_drop = count;
    }

    // -----------------------------------------------------------------------
    // Averages
    // -----------------------------------------------------------------------

    /// The student's course average as a percentage, per the grading mode.
    /// Only categorized assignments count. 0.0 when nothing is graded.
    pub fn calculate_student_average(&self, student: &StudentId) -> f64 {
        match self.grading_mode {
            GradingMode::TotalPoints => self.total_points_average(student),
            GradingMode::Weighted => self.weighted_average(student),
        }
    }

    fn total_points_average(&self, student: &StudentId) -> f64 {
        let mut earned = 0.0;
        let mut possible = 0.0;
        for category in &self.categories {
            let grades = category.student_grades(student, &self.assignments);
            for grade in calculator::drop_lowest_grades(&grades, category.drop_lowest_count()) {
                earned += grade.points_received();
                possible += grade.max_points();
            }
        }
        if possible > 0.0 {
            earned / possible * 100.0
        } else {
            0.0
        }
    }

    fn weighted_average(&self, student: &StudentId) -> f64 {
        let total_weight: f64 = self.categories.iter().map(Category::weight).sum();
        if total_weight == 0.0 {
            return 0.0;
        }
        self.categories
            .iter()
            .map(|c| c.calculate_category_average(student, &self.assignments))
            .sum()
    }

    /// Mean of every enrolled student's average, 0.0 with no students.
    pub fn calculate_class_average(&self) -> f64 {
        calculator::mean(&self.student_averages())
    }

    /// Median of every enrolled student's average, 0.0 with no students.
    pub fn calculate_class_median(&self) -> f64 {
        calculator::median(&self.student_averages())
    }

    fn student_averages(&self) -> Vec<f64> {
        self.students
            .iter()
            .map(|p| self.calculate_student_average(&p.id))
            .collect()
    }

    /// Letter that the student's current average maps to.
    pub fn suggested_final_grade(&self, student: &StudentId) -> FinalGrade {
        calculator::letter_grade(self.calculate_student_average(student))
    }

    // -----------------------------------------------------------------------
    // Ordering and grouping
    // -----------------------------------------------------------------------

    /// Students ordered by last name, then first name.
    pub fn sort_students_by_name(&self) -> Vec<Person> {
        let mut sorted = self.students.clone();
        sorted.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        sorted
    }

    /// Students ordered by their percentage on one assignment, highest
    /// first. Ungraded students (or every student, if the title is unknown)
    /// come last in enrollment order.
    pub fn sort_students_by_assignment_grade(&self, title: &str) -> Vec<Person> {
        let assignment = self.assignment(title);
        let percentage = |p: &Person| {
            assignment
                .and_then(|a| a.grade(&p.id))
                .map(Grade::percentage)
        };
        let mut sorted = self.students.clone();
        sorted.sort_by(|a, b| match (percentage(a), percentage(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        sorted
    }

    /// Split the roster, in enrollment order, into consecutive groups of
    /// `size`. The last group may be smaller.
    pub fn group_students(&self, size: usize) -> Vec<Vec<Person>> {
        if size == 0 {
            return Vec::new();
        }
        self.students.chunks(size).map(<[Person]>::to_vec).collect()
    }

    // -----------------------------------------------------------------------
    // Final grades
    // -----------------------------------------------------------------------

    /// Record a final grade in both the course and the student's record.
    pub fn assign_final_grade(&mut self, student: &mut Student, grade: FinalGrade) -> Result<()> {
        if !self.is_enrolled(student.id()) {
            return Err(GradebookError::NotEnrolled {
                student: student.username().to_string(),
                course: self.name.clone(),
            });
        }
        self.final_grades.insert(student.id().clone(), grade);
        student.record_final_grade(&self.name, grade);
        debug!(course = %self.name, student = %student.id(), %grade, "final grade assigned");
        self.notify_observers();
        Ok(())
    }

    pub fn final_grade(&self, student: &StudentId) -> Option<FinalGrade> {
        self.final_grades.get(student).copied()
    }

    pub fn final_grades(&self) -> &HashMap<StudentId, FinalGrade> {
        &self.final_grades
    }

    /// A course is completed for a student once a final grade is recorded.
    pub fn is_completed(&self, student: &StudentId) -> bool {
        self.final_grades.contains_key(student)
    }
}
