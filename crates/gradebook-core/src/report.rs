//! Course reports and transcripts with JSON persistence and regression
//! detection between report snapshots.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator;
use crate::course::{Course, GradingMode};
use crate::error::GradebookError;
use crate::grade::{FinalGrade, Grade};
use crate::model::GradebookModel;

/// A snapshot of one course's grades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Course name.
    pub course: String,
    pub grading_mode: GradingMode,
    /// Mean of the student averages.
    pub class_average: f64,
    /// Median of the student averages.
    pub class_median: f64,
    /// One row per enrolled student, sorted by last then first name.
    pub students: Vec<StudentRow>,
    /// One entry per assignment, in course order.
    pub assignments: Vec<AssignmentStats>,
}

/// A student's standing in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub username: String,
    pub name: String,
    /// Course average under the course's grading mode.
    pub average: f64,
    /// Earned over possible points across every graded assignment,
    /// ignoring categories.
    pub simple_average: f64,
    /// Letter the average maps to.
    pub letter: FinalGrade,
    /// Final grade, if one has been recorded.
    pub final_grade: Option<FinalGrade>,
}

/// How the class did on one assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentStats {
    pub title: String,
    pub max_points: f64,
    /// Enrolled students with a grade.
    pub graded_count: usize,
    pub average_percent: f64,
    pub median_percent: f64,
}

impl CourseReport {
    /// Build a report for a course registered in `model`.
    pub fn build(course: &Course, model: &GradebookModel) -> Self {
        let students = course
            .sort_students_by_name()
            .into_iter()
            .map(|person| {
                let average = course.calculate_student_average(&person.id);
                let simple_average = model
                    .student(person.username())
                    .map(|s| s.average_for_course(course))
                    .unwrap_or(0.0);
                StudentRow {
                    username: person.username().to_string(),
                    name: person.full_name(),
                    average,
                    simple_average,
                    letter: calculator::letter_grade(average),
                    final_grade: course.final_grade(&person.id),
                }
            })
            .collect();

        let assignments = course
            .assignments()
            .iter()
            .map(|a| {
                let grades: Vec<Grade> = course
                    .students()
                    .iter()
                    .filter_map(|p| a.grade(&p.id).copied())
                    .collect();
                AssignmentStats {
                    title: a.title().to_string(),
                    max_points: a.max_points(),
                    graded_count: grades.len(),
                    average_percent: calculator::calculate_average(&grades),
                    median_percent: calculator::calculate_median(&grades),
                }
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            course: course.name().to_string(),
            grading_mode: course.grading_mode(),
            class_average: course.calculate_class_average(),
            class_median: course.calculate_class_median(),
            students,
            assignments,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: CourseReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline. A student whose average moved
    /// by more than `threshold` percentage points counts as a change.
    pub fn compare(&self, baseline: &CourseReport, threshold: f64) -> ComparisonReport {
        let averages = |report: &CourseReport| -> HashMap<String, f64> {
            report
                .students
                .iter()
                .map(|s| (s.username.clone(), s.average))
                .collect()
        };

        let baseline_averages = averages(baseline);
        let current_averages = averages(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_students = Vec::new();

        // Walk the current rows so the output keeps the report's name order
        for row in &self.students {
            let current = row.average;
            let Some(&before) = baseline_averages.get(&row.username) else {
                new_students.push(row.username.clone());
                continue;
            };
            let delta = current - before;
            let change = AverageChange {
                username: row.username.clone(),
                baseline_average: before,
                current_average: current,
                delta,
            };
            if delta < -threshold {
                regressions.push(change);
            } else if delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_students = baseline
            .students
            .iter()
            .filter(|s| !current_averages.contains_key(&s.username))
            .map(|s| s.username.clone())
            .collect();

        ComparisonReport {
            course: self.course.clone(),
            baseline_class_average: baseline.class_average,
            current_class_average: self.class_average,
            regressions,
            improvements,
            unchanged,
            new_students,
            removed_students,
        }
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.course));
        md.push_str(&format!(
            "**Grading:** {} | **Class average:** {:.2}% | **Class median:** {:.2}%\n\n",
            self.grading_mode, self.class_average, self.class_median
        ));

        if !self.students.is_empty() {
            md.push_str("### Students\n\n");
            md.push_str("| Student | Name | Average | Simple | Letter | Final |\n");
            md.push_str("|---------|------|---------|--------|--------|-------|\n");
            for s in &self.students {
                md.push_str(&format!(
                    "| {} | {} | {:.2}% | {:.2}% | {} | {} |\n",
                    s.username,
                    s.name,
                    s.average,
                    s.simple_average,
                    s.letter,
                    s.final_grade.map_or_else(|| "-".to_string(), |g| g.to_string())
                ));
            }
            md.push('\n');
        }

        if !self.assignments.is_empty() {
            md.push_str("### Assignments\n\n");
            md.push_str("| Assignment | Max | Graded | Average | Median |\n");
            md.push_str("|------------|-----|--------|---------|--------|\n");
            for a in &self.assignments {
                md.push_str(&format!(
                    "| {} | {} | {} | {:.2}% | {:.2}% |\n",
                    a.title, a.max_points, a.graded_count, a.average_percent, a.median_percent
                ));
            }
        }

        md
    }
}

/// Result of comparing two course reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub course: String,
    pub baseline_class_average: f64,
    pub current_class_average: f64,
    /// Students whose average went down.
    pub regressions: Vec<AverageChange>,
    /// Students whose average went up.
    pub improvements: Vec<AverageChange>,
    /// Students with no significant change.
    pub unchanged: usize,
    /// Students in current but not baseline.
    pub new_students: Vec<String>,
    /// Students in baseline but not current.
    pub removed_students: Vec<String>,
}

/// A student's average in two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageChange {
    pub username: String,
    pub baseline_average: f64,
    pub current_average: f64,
    pub delta: f64,
}

impl ComparisonReport {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));
        md.push_str(&format!(
            "**Class average:** {:.2}% -> {:.2}%\n\n",
            self.baseline_class_average, self.current_class_average
        ));

        let sections = [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ];
        for (title, changes) in sections {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Student | Baseline | Current | Delta |\n");
            md.push_str("|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.2}% | {:.2}% | {:+.2} |\n",
                    c.username, c.baseline_average, c.current_average, c.delta
                ));
            }
            md.push('\n');
        }

        if !self.new_students.is_empty() {
            md.push_str(&format!("**New:** {}\n\n", self.new_students.join(", ")));
        }
        if !self.removed_students.is_empty() {
            md.push_str(&format!("**Removed:** {}\n", self.removed_students.join(", ")));
        }

        md
    }

    /// Returns true if any student's average dropped.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

/// One student's record across every course in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Enrolled courses, sorted by name.
    pub courses: Vec<TranscriptEntry>,
    /// Mean grade points over recorded final grades.
    pub gpa: f64,
}

/// A student's standing in one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub course: String,
    pub average: f64,
    pub letter: FinalGrade,
    pub final_grade: Option<FinalGrade>,
    /// Graded assignments over assignments in the course.
    pub graded: usize,
    pub total: usize,
}

impl Transcript {
    pub fn build(model: &GradebookModel, username: &str) -> crate::error::Result<Self> {
        let student = model
            .student(username)
            .ok_or_else(|| GradebookError::UnknownStudent(username.to_string()))?;

        let courses = model
            .courses()
            .into_iter()
            .filter(|c| c.is_enrolled(student.id()))
            .map(|course| {
                let average = course.calculate_student_average(student.id());
                let graded = course
                    .assignments()
                    .iter()
                    .filter(|a| a.is_graded(student.id()))
                    .count();
                TranscriptEntry {
                    course: course.name().to_string(),
                    average,
                    letter: calculator::letter_grade(average),
                    final_grade: student.final_grade(course.name()),
                    graded,
                    total: course.assignments().len(),
                }
            })
            .collect();

        Ok(Self {
            username: student.username().to_string(),
            name: student.person().full_name(),
            created_at: Utc::now(),
            courses,
            gpa: student.calculate_gpa(),
        })
    }

    /// Format the transcript as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = format!("## {} ({})\n\n", self.name, self.username);
        md.push_str("| Course | Average | Letter | Final | Graded |\n");
        md.push_str("|--------|---------|--------|-------|--------|\n");
        for c in &self.courses {
            md.push_str(&format!(
                "| {} | {:.2}% | {} | {} | {}/{} |\n",
                c.course,
                c.average,
                c.letter,
                c.final_grade.map_or_else(|| "-".to_string(), |g| g.to_string()),
                c.graded,
                c.total
            ));
        }
        md.push_str(&format!("\n**GPA:** {:.2}\n", self.gpa));
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_course_str;
    use std::path::PathBuf;

    const COURSE: &str = r#"
[course]
name = "CSC335"

[[students]]
username = "akush"
first_name = "Alina"
last_name = "Kushareva"
final_grade = "B"

[[students]]
username = "bchen"
first_name = "Bo"
last_name = "Chen"

[[assignments]]
title = "HW1"
max_points = 10.0
[assignments.grades]
akush = 8.0
bchen = 6.0

[[assignments]]
title = "HW2"
max_points = 20.0
[assignments.grades]
akush = 18.0

[[categories]]
name = "Homework"
weight = 1.0
assignments = ["HW1", "HW2"]
"#;

    fn load() -> GradebookModel {
        let mut model = GradebookModel::new();
        parse_course_str(COURSE, &PathBuf::from("csc335.toml"), &mut model).unwrap();
        model
    }

    fn report(model: &GradebookModel) -> CourseReport {
        CourseReport::build(model.course("CSC335").unwrap(), model)
    }

    fn with_average(mut report: CourseReport, username: &str, average: f64) -> CourseReport {
        for row in &mut report.students {
            if row.username == username {
                row.average = average;
            }
        }
        report
    }

    #[test]
    fn build_summarises_course() {
        let model = load();
        let r = report(&model);

        assert_eq!(r.course, "CSC335");
        // Chen sorts before Kushareva.
        assert_eq!(r.students[0].username, "bchen");
        assert!((r.students[1].average - 26.0 / 30.0 * 100.0).abs() < 1e-9);
        assert_eq!(r.students[1].letter, FinalGrade::B);
        assert_eq!(r.students[1].final_grade, Some(FinalGrade::B));
        assert_eq!(r.students[0].final_grade, None);

        assert_eq!(r.assignments[0].graded_count, 2);
        assert!((r.assignments[0].average_percent - 70.0).abs() < 1e-9);
        assert_eq!(r.assignments[1].graded_count, 1);
        assert_eq!(r.assignments[1].median_percent, 90.0);
        assert!((r.class_median - r.class_average).abs() < 1e-9);
    }

    #[test]
    fn compare_identical_reports() {
        let model = load();
        let r = report(&model);
        let cmp = r.compare(&r.clone(), 2.0);
        assert!(cmp.regressions.is_empty());
        assert!(cmp.improvements.is_empty());
        assert_eq!(cmp.unchanged, 2);
        assert!(!cmp.has_regressions());
    }

    #[test]
    fn compare_with_regression_and_improvement() {
        let model = load();
        let baseline = report(&model);
        let current = with_average(with_average(baseline.clone(), "akush", 50.0), "bchen", 95.0);

        let cmp = current.compare(&baseline, 2.0);
        assert_eq!(cmp.regressions.len(), 1);
        assert_eq!(cmp.regressions[0].username, "akush");
        assert_eq!(cmp.improvements.len(), 1);
        assert!(cmp.has_regressions());

        // Within the threshold counts as unchanged.
        let small = with_average(baseline.clone(), "akush", baseline.students[1].average - 1.0);
        assert!(!small.compare(&baseline, 2.0).has_regressions());
    }

    #[test]
    fn compare_with_new_and_removed() {
        let model = load();
        let baseline = report(&model);
        let mut current = baseline.clone();
        current.students[0].username = "newbie".into();

        let cmp = current.compare(&baseline, 2.0);
        assert_eq!(cmp.new_students, vec!["newbie"]);
        assert_eq!(cmp.removed_students, vec!["bchen"]);
    }

    #[test]
    fn json_roundtrip() {
        let model = load();
        let r = report(&model);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        r.save_json(&path).unwrap();
        let loaded = CourseReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, r.id);
        assert_eq!(loaded.students.len(), 2);
        assert_eq!(loaded.grading_mode, GradingMode::TotalPoints);
    }

    #[test]
    fn markdown_output() {
        let model = load();
        let baseline = report(&model);
        let current = with_average(baseline.clone(), "bchen", 0.0);

        let md = current.to_markdown();
        assert!(md.contains("## CSC335"));
        assert!(md.contains("| bchen | Bo Chen |"));

        let cmp = current.compare(&baseline, 2.0).to_markdown();
        assert!(cmp.contains("Regressions"));
        assert!(cmp.contains("bchen"));
    }

    #[test]
    fn transcript_lists_enrolled_courses() {
        let mut model = load();
        let other = r#"
[course]
name = "ART100"

[[students]]
username = "akush"
final_grade = "A"
"#;
        parse_course_str(other, &PathBuf::from("art.toml"), &mut model).unwrap();

        let t = Transcript::build(&model, "akush").unwrap();
        assert_eq!(t.name, "Alina Kushareva");
        let names: Vec<&str> = t.courses.iter().map(|c| c.course.as_str()).collect();
        assert_eq!(names, vec!["ART100", "CSC335"]);
        assert_eq!(t.courses[1].graded, 2);
        assert_eq!(t.courses[1].total, 2);
        assert_eq!(t.gpa, 3.5);
        assert!(t.to_markdown().contains("**GPA:** 3.50"));

        assert_eq!(
            Transcript::build(&model, "ghost").unwrap_err(),
            GradebookError::UnknownStudent("ghost".into())
        );
    }
}
