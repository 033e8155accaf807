//! People in the gradebook and the per-student academic record.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::course::Course;
use crate::grade::{FinalGrade, Grade};

/// Stable identity of a student: the username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StudentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identity and display name of a user. Equality and hashing use the
/// username only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: StudentId::new(username),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn username(&self) -> &str {
        self.id.as_str()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Person {}

impl Hash for Person {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Identifies one assignment across courses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentKey {
    pub course: String,
    pub title: String,
}

impl AssignmentKey {
    pub fn new(course: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            title: title.into(),
        }
    }
}

/// A student with their grades, final grades, and enrolled courses.
///
/// The grade and final-grade maps mirror what each course stores; they are
/// written only through [`Course`] operations so the two sides stay in step.
#[derive(Debug, Clone)]
pub struct Student {
    person: Person,
    grades: HashMap<AssignmentKey, Grade>,
    final_grades: HashMap<String, FinalGrade>,
    courses: Vec<String>,
}

impl Student {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self::from_person(Person::new(username, first_name, last_name))
    }

    pub fn from_person(person: Person) -> Self {
        Self {
            person,
            grades: HashMap::new(),
            final_grades: HashMap::new(),
            courses: Vec::new(),
        }
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn id(&self) -> &StudentId {
        &self.person.id
    }

    pub fn username(&self) -> &str {
        self.person.username()
    }

    pub fn grade(&self, key: &AssignmentKey) -> Option<&Grade> {
        self.grades.get(key)
    }

    pub fn grades(&self) -> &HashMap<AssignmentKey, Grade> {
        &self.grades
    }

    pub fn final_grade(&self, course: &str) -> Option<FinalGrade> {
        self.final_grades.get(course).copied()
    }

    pub fn final_grades(&self) -> &HashMap<String, FinalGrade> {
        &self.final_grades
    }

    /// Names of the courses this student is enrolled in, in enrollment order.
    pub fn courses(&self) -> &[String] {
        &self.courses
    }

    pub fn is_enrolled_in(&self, course: &str) -> bool {
        self.courses.iter().any(|c| c == course)
    }

    /// Simple total-points average over the course's assignments.
    ///
    /// Only assignments this student has a grade for count, on both sides of
    /// the ratio. Categories and drop rules are ignored, so this can differ
    /// from [`Course::calculate_student_average`]. Grades are read from the
    /// course's assignments, so a grade left over from a removed assignment
    /// of the same title never counts.
    pub fn average_for_course(&self, course: &Course) -> f64 {
        let mut earned = 0.0;
        let mut possible = 0.0;
        for assignment in course.assignments() {
            if let Some(grade) = assignment.grade(self.id()) {
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

    /// Mean grade points over every recorded final grade, 0.0 if none.
    pub fn calculate_gpa(&self) -> f64 {
        let finals: Vec<FinalGrade> = self.final_grades.values().copied().collect();
        crate::calculator::calculate_gpa(&finals)
    }

    pub(crate) fn record_grade(&mut self, key: AssignmentKey, grade: Grade) {
        self.grades.insert(key, grade);
    }

    pub(crate) fn forget_grade(&mut self, key: &AssignmentKey) -> bool {
        self.grades.remove(key).is_some()
    }

    pub(crate) fn record_final_grade(&mut self, course: &str, grade: FinalGrade) {
        self.final_grades.insert(course.to_string(), grade);
    }

    pub(crate) fn clear_final_grade(&mut self, course: &str) {
        self.final_grades.remove(course);
    }

    pub(crate) fn add_course(&mut self, course: &str) {
        if !self.is_enrolled_in(course) {
            self.courses.push(course.to_string());
        }
    }

    pub(crate) fn remove_course(&mut self, course: &str) {
        self.courses.retain(|c| c != course);
    }
}

/// A teacher and the names of the courses they teach.
#[derive(Debug, Clone)]
pub struct Teacher {
    person: Person,
    teaching_courses: Vec<String>,
}

impl Teacher {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            person: Person::new(username, first_name, last_name),
            teaching_courses: Vec::new(),
        }
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn username(&self) -> &str {
        self.person.username()
    }

    /// Returns `false` if the course was already listed.
    pub fn add_course(&mut self, course: &str) -> bool {
        if self.teaching_courses.iter().any(|c| c == course) {
            return false;
        }
        self.teaching_courses.push(course.to_string());
        true
    }

    pub fn remove_course(&mut self, course: &str) -> bool {
        let before = self.teaching_courses.len();
        self.teaching_courses.retain(|c| c != course);
        self.teaching_courses.len() != before
    }

    pub fn teaching_courses(&self) -> &[String] {
        &self.teaching_courses
    }
}
