//! The gradebook registry: every student, teacher, and course by key.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::calculator;
use crate::course::Course;
use crate::error::{GradebookError, Result};
use crate::grade::{FinalGrade, Grade};
use crate::observer::{Observer, ObserverHandle, ObserverList};
use crate::student::{Person, Student, StudentId, Teacher};

/// Owns all students, teachers, and courses and routes cross-entity
/// operations through them.
///
/// Courses and students live in separate maps so an operation such as
/// [`enroll`](Self::enroll) can borrow one course and one student mutably at
/// the same time.
#[derive(Debug, Default)]
pub struct GradebookModel {
    students: HashMap<StudentId, Student>,
    teachers: HashMap<String, Teacher>,
    courses: HashMap<String, Course>,
    observers: ObserverList,
}

impl GradebookModel {
    pub fn new() -> Self {
        Self::default()
    }

    // -- observers --

    pub fn subscribe(&mut self, observer: Rc<dyn Observer>) -> ObserverHandle {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        self.observers.unsubscribe(handle)
    }

    pub fn notify_observers(&self) {
        self.observers.notify();
    }

    // -- students --

    /// Register a student. Returns `false`, keeping the existing record, if
    /// the username is taken: courses already list that student and their
    /// grades live in the existing record.
    pub fn add_student(&mut self, student: Student) -> bool {
        if self.students.contains_key(student.id()) {
            return false;
        }
        debug!(student = %student.id(), "student registered");
        self.students.insert(student.id().clone(), student);
        true
    }

    pub fn student(&self, username: &str) -> Option<&Student> {
        self.students.get(&StudentId::from(username))
    }

    pub fn student_mut(&mut self, username: &str) -> Option<&mut Student> {
        self.students.get_mut(&StudentId::from(username))
    }

    pub fn student_exists(&self, username: &str) -> bool {
        self.students.contains_key(&StudentId::from(username))
    }

    /// All students, sorted by username.
    pub fn students(&self) -> Vec<&Student> {
        let mut all: Vec<&Student> = self.students.values().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    // -- teachers --

    pub fn add_teacher(&mut self, teacher: Teacher) {
        debug!(teacher = teacher.username(), "teacher registered");
        self.teachers.insert(teacher.username().to_string(), teacher);
    }

    pub fn teacher(&self, username: &str) -> Option<&Teacher> {
        self.teachers.get(username)
    }

    pub fn teacher_mut(&mut self, username: &str) -> Option<&mut Teacher> {
        self.teachers.get_mut(username)
    }

    pub fn teacher_exists(&self, username: &str) -> bool {
        self.teachers.contains_key(username)
    }

    /// All teachers, sorted by username.
    pub fn teachers(&self) -> Vec<&Teacher> {
        let mut all: Vec<&Teacher> = self.teachers.values().collect();
        all.sort_by(|a, b| a.username().cmp(b.username()));
        all
    }

    /// Every registered person, students then teachers, each sorted by
    /// username.
    pub fn all_users(&self) -> Vec<&Person> {
        let mut students: Vec<&Person> = self.students.values().map(Student::person).collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        let mut teachers: Vec<&Person> = self.teachers.values().map(Teacher::person).collect();
        teachers.sort_by(|a, b| a.id.cmp(&b.id));
        students.extend(teachers);
        students
    }

    // -- courses --

    /// Register a course, replacing any course with the same name.
    pub fn add_course(&mut self, course: Course) {
        debug!(course = course.name(), "course registered");
        self.courses.insert(course.name().to_string(), course);
        self.notify_observers();
    }

    /// Create an empty course taught by `teacher`.
    pub fn create_course(&mut self, teacher: &str, name: &str) -> Result<&mut Course> {
        if self.courses.contains_key(name) {
            return Err(GradebookError::DuplicateCourse(name.to_string()));
        }
        let owner = self
            .teachers
            .get_mut(teacher)
            .ok_or_else(|| GradebookError::UnknownTeacher(teacher.to_string()))?;
        owner.add_course(name);
        debug!(course = name, teacher, "course created");
        self.courses.insert(name.to_string(), Course::new(name));
        self.notify_observers();
        self.course_mut(name)
    }

    pub fn course(&self, name: &str) -> Option<&Course> {
        self.courses.get(name)
    }

    pub fn course_mut(&mut self, name: &str) -> Result<&mut Course> {
        self.courses
            .get_mut(name)
            .ok_or_else(|| GradebookError::UnknownCourse(name.to_string()))
    }

    pub fn course_exists(&self, name: &str) -> bool {
        self.courses.contains_key(name)
    }

    /// All courses, sorted by name.
    pub fn courses(&self) -> Vec<&Course> {
        let mut all: Vec<&Course> = self.courses.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Courses a teacher teaches, sorted by name.
    pub fn teaching_courses(&self, teacher: &str) -> Vec<&Course> {
        let Some(t) = self.teachers.get(teacher) else {
            return Vec::new();
        };
        let mut taught: Vec<&Course> = t
            .teaching_courses()
            .iter()
            .filter_map(|name| self.courses.get(name))
            .collect();
        taught.sort_by(|a, b| a.name().cmp(b.name()));
        taught
    }

    // -- cross-entity operations --

    fn pair_mut(&mut self, course: &str, username: &str) -> Result<(&mut Course, &mut Student)> {
        let course = self
            .courses
            .get_mut(course)
            .ok_or_else(|| GradebookError::UnknownCourse(course.to_string()))?;
        let student = self
            .students
            .get_mut(&StudentId::from(username))
            .ok_or_else(|| GradebookError::UnknownStudent(username.to_string()))?;
        Ok((course, student))
    }

    /// Enroll a registered student. `Ok(false)` if already enrolled.
    pub fn enroll(&mut self, course: &str, username: &str) -> Result<bool> {
        let (course, student) = self.pair_mut(course, username)?;
        Ok(course.add_student(student))
    }

    /// Withdraw a registered student. `Ok(false)` if they were not enrolled.
    pub fn withdraw(&mut self, course: &str, username: &str) -> Result<bool> {
        let (course, student) = self.pair_mut(course, username)?;
        Ok(course.remove_student(student))
    }

    pub fn assign_grade(
        &mut self,
        course: &str,
        assignment: &str,
        username: &str,
        points: f64,
    ) -> Result<Grade> {
        let (course, student) = self.pair_mut(course, username)?;
        course.assign_grade(assignment, student, points)
    }

    pub fn assign_final_grade(
        &mut self,
        course: &str,
        username: &str,
        grade: FinalGrade,
    ) -> Result<()> {
        let (course, student) = self.pair_mut(course, username)?;
        course.assign_final_grade(student, grade)
    }

    /// Remove an assignment from a course and forget its grades in every
    /// student record, including students who have since withdrawn.
    /// `Ok(false)` if the course has no such assignment.
    pub fn remove_assignment(&mut self, course: &str, title: &str) -> Result<bool> {
        let course = self
            .courses
            .get_mut(course)
            .ok_or_else(|| GradebookError::UnknownCourse(course.to_string()))?;
        let Some(assignment) = course.assignment(title) else {
            return Ok(false);
        };
        let key = assignment.key();
        let graded: Vec<StudentId> = assignment.grades().keys().cloned().collect();
        course.remove_assignment(title);
        for id in &graded {
            if let Some(student) = self.students.get_mut(id) {
                student.forget_grade(&key);
            }
        }
        debug!(course = %key.course, title, forgotten = graded.len(), "assignment removed");
        Ok(true)
    }

    /// Median of the raw points received on one assignment by the course's
    /// enrolled students. Ungraded students are skipped; 0.0 if none graded.
    pub fn calculate_assignment_median(&self, course: &str, assignment: &str) -> Result<f64> {
        let course = self
            .courses
            .get(course)
            .ok_or_else(|| GradebookError::UnknownCourse(course.to_string()))?;
        let assignment = course
            .assignment(assignment)
            .ok_or_else(|| GradebookError::UnknownAssignment(assignment.to_string()))?;
        let points: Vec<f64> = course
            .students()
            .iter()
            .filter_map(|p| assignment.grade(&p.id))
            .map(Grade::points_received)
            .collect();
        Ok(calculator::median(&points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Assignment;
    use std::cell::Cell;

    fn model_with_course() -> GradebookModel {
        let mut model = GradebookModel::new();
        model.add_teacher(Teacher::new("prof", "Grace", "Hopper"));
        for (u, f, l) in [("s1", "Ada", "Lovelace"), ("s2", "Bo", "Chen"), ("s3", "Cy", "Diaz")] {
            model.add_student(Student::new(u, f, l));
        }
        let course = model.create_course("prof", "CSC335").unwrap();
        let hw = Assignment::new("HW1", 20.0, course).unwrap();
        course.add_assignment(hw);
        model
    }

    #[test]
    fn create_course_links_teacher() {
        let model = model_with_course();
        assert!(model.course_exists("CSC335"));
        assert_eq!(
            model.teacher("prof").unwrap().teaching_courses(),
            ["CSC335".to_string()]
        );
        assert_eq!(model.teaching_courses("prof").len(), 1);
        assert!(model.teaching_courses("nobody").is_empty());
    }

    #[test]
    fn duplicate_course_name_rejected() {
        let mut model = model_with_course();
        assert_eq!(
            model.create_course("prof", "CSC335").map(|_| ()),
            Err(GradebookError::DuplicateCourse("CSC335".into()))
        );
        assert_eq!(model.teacher("prof").unwrap().teaching_courses().len(), 1);
    }

    #[test]
    fn enroll_and_withdraw_update_both_sides() {
        let mut model = model_with_course();
        assert_eq!(model.enroll("CSC335", "s1"), Ok(true));
        assert_eq!(model.enroll("CSC335", "s1"), Ok(false));
        assert!(model.student("s1").unwrap().is_enrolled_in("CSC335"));
        assert!(model.course("CSC335").unwrap().is_enrolled(&"s1".into()));

        assert_eq!(model.withdraw("CSC335", "s1"), Ok(true));
        assert!(!model.student("s1").unwrap().is_enrolled_in("CSC335"));
        assert!(model.enroll("CSC335", "ghost").is_err());
        assert!(model.enroll("MATH101", "s1").is_err());
    }

    #[test]
    fn assignment_median_uses_raw_points() {
        let mut model = model_with_course();
        for u in ["s1", "s2", "s3"] {
            model.enroll("CSC335", u).unwrap();
        }
        assert_eq!(model.calculate_assignment_median("CSC335", "HW1"), Ok(0.0));

        model.assign_grade("CSC335", "HW1", "s1", 10.0).unwrap();
        model.assign_grade("CSC335", "HW1", "s2", 16.0).unwrap();
        assert_eq!(model.calculate_assignment_median("CSC335", "HW1"), Ok(13.0));

        model.assign_grade("CSC335", "HW1", "s3", 20.0).unwrap();
        assert_eq!(model.calculate_assignment_median("CSC335", "HW1"), Ok(16.0));
        assert!(model.calculate_assignment_median("CSC335", "HW9").is_err());
    }

    #[test]
    fn final_grade_through_registry() {
        let mut model = model_with_course();
        model.enroll("CSC335", "s2").unwrap();
        model
            .assign_final_grade("CSC335", "s2", FinalGrade::A)
            .unwrap();
        assert_eq!(model.student("s2").unwrap().calculate_gpa(), 4.0);
    }

    #[test]
    fn courses_and_users_are_sorted() {
        let mut model = model_with_course();
        model.add_course(Course::new("ART100"));
        let names: Vec<&str> = model.courses().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["ART100", "CSC335"]);

        let users: Vec<&str> = model.all_users().iter().map(|p| p.username()).collect();
        assert_eq!(users, vec!["s1", "s2", "s3", "prof"]);
        assert!(model.student_exists("s3"));
        assert!(model.teacher_exists("prof"));
        assert!(!model.student_exists("prof"));
    }

    /// Every grade a course's assignments hold is mirrored in the student
    /// record, and every student-side grade for the course has a matching
    /// assignment grade.
    fn assert_grades_mirrored(model: &GradebookModel, course: &str) {
        let course = model.course(course).unwrap();
        for assignment in course.assignments() {
            for (id, grade) in assignment.grades() {
                let student = model.student(id.as_str()).unwrap();
                assert_eq!(student.grade(&assignment.key()), Some(grade));
            }
        }
        for student in model.students() {
            for (key, grade) in student.grades() {
                if key.course != course.name() {
                    continue;
                }
                let assignment = course.assignment(&key.title).unwrap();
                assert_eq!(assignment.grade(student.id()), Some(grade));
            }
        }
    }

    #[test]
    fn removing_assignment_clears_student_records() {
        let mut model = model_with_course();
        for u in ["s1", "s2"] {
            model.enroll("CSC335", u).unwrap();
        }
        model.assign_grade("CSC335", "HW1", "s1", 10.0).unwrap();
        model.assign_grade("CSC335", "HW1", "s2", 15.0).unwrap();
        model.withdraw("CSC335", "s2").unwrap();
        assert_grades_mirrored(&model, "CSC335");

        assert_eq!(model.remove_assignment("CSC335", "HW1"), Ok(true));
        assert_eq!(model.remove_assignment("CSC335", "HW1"), Ok(false));
        assert!(model.remove_assignment("MATH101", "HW1").is_err());
        assert!(model.student("s1").unwrap().grades().is_empty());
        assert!(model.student("s2").unwrap().grades().is_empty());
        assert_grades_mirrored(&model, "CSC335");

        // A new assignment with the old title starts ungraded.
        let course = model.course_mut("CSC335").unwrap();
        let hw = Assignment::new("HW1", 40.0, course).unwrap();
        course.add_assignment(hw);
        let course = model.course("CSC335").unwrap();
        let s1 = model.student("s1").unwrap();
        assert_eq!(s1.average_for_course(course), 0.0);
        assert_grades_mirrored(&model, "CSC335");
    }

    #[test]
    fn re_adding_a_username_keeps_the_existing_record() {
        let mut model = model_with_course();
        model.enroll("CSC335", "s1").unwrap();
        model.assign_grade("CSC335", "HW1", "s1", 12.0).unwrap();

        assert!(!model.add_student(Student::new("s1", "Someone", "Else")));
        let s1 = model.student("s1").unwrap();
        assert_eq!(s1.person().first_name, "Ada");
        assert!(s1.is_enrolled_in("CSC335"));
        assert_grades_mirrored(&model, "CSC335");
    }

    #[test]
    fn course_registration_notifies() {
        let mut model = GradebookModel::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        model.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        model.add_course(Course::new("CSC335"));
        model.add_teacher(Teacher::new("prof", "Grace", "Hopper"));
        model.create_course("prof", "MATH101").unwrap();
        assert_eq!(hits.get(), 2);
    }
}
