//! TOML course file parser.
//!
//! Loads courses from TOML files and directories into a [`GradebookModel`],
//! writes them back, and validates their grading setup.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::category::Category;
use crate::course::{Course, GradingMode};
use crate::grade::FinalGrade;
use crate::model::GradebookModel;
use crate::student::{Person, Student, Teacher};

/// Intermediate TOML structure for course files.
#[derive(Debug, Deserialize, Serialize)]
struct TomlCourseFile {
    course: TomlCourseHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    teacher: Option<TomlPerson>,
    #[serde(default)]
    students: Vec<TomlStudent>,
    #[serde(default)]
    assignments: Vec<TomlAssignment>,
    #[serde(default)]
    categories: Vec<TomlCategory>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TomlCourseHeader {
    name: String,
    #[serde(default)]
    grading_mode: Option<String>,
    #[serde(default)]
    assignments_to_drop: usize,
}

#[derive(Debug, Deserialize, Serialize)]
struct TomlPerson {
    username: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct TomlStudent {
    username: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_grade: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TomlAssignment {
    title: String,
    max_points: f64,
    #[serde(default)]
    grades: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TomlCategory {
    name: String,
    weight: f64,
    #[serde(default)]
    drop_lowest: usize,
    #[serde(default)]
    assignments: Vec<String>,
}

/// Parse a single course file into `model`. Returns the course name.
pub fn parse_course_file(path: &Path, model: &mut GradebookModel) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read course file: {}", path.display()))?;

    parse_course_str(&content, path, model)
}

/// Parse a TOML string into `model` (useful for testing).
///
/// The course is rebuilt through the regular course operations, so every
/// grade, weight, and enrollment rule applies exactly as it would
/// interactively. Students already registered under the same username are
/// reused. Grades and final grade letters are checked before the registry
/// is touched, so a rejected file leaves `model` unchanged apart from newly
/// registered students.
pub fn parse_course_str(
    content: &str,
    source_path: &Path,
    model: &mut GradebookModel,
) -> Result<String> {
    let parsed: TomlCourseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let name = parsed.course.name.clone();
    if model.course_exists(&name) {
        anyhow::bail!("course {name} is already loaded");
    }

    let mut course = Course::new(name.as_str());
    if let Some(mode) = &parsed.course.grading_mode {
        let mode: GradingMode = mode.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
        course.set_grading_mode(mode);
    }
    course.set_assignments_to_drop(parsed.course.assignments_to_drop);

    for a in &parsed.assignments {
        let assignment = Assignment::new(a.title.as_str(), a.max_points, &course)
            .with_context(|| format!("assignment {}", a.title))?;
        if !course.add_assignment(assignment) {
            anyhow::bail!("duplicate assignment title: {}", a.title);
        }
    }

    for c in &parsed.categories {
        let mut category =
            Category::new(c.name.as_str(), c.weight).with_context(|| format!("category {}", c.name))?;
        category.set_drop_lowest_count(c.drop_lowest);
        for title in &c.assignments {
            let assignment = course.assignment(title).with_context(|| {
                format!("category {} lists unknown assignment {title}", c.name)
            })?;
            category.add_assignment(assignment);
        }
        if !course.add_category(category) {
            anyhow::bail!(
                "category {} would push the total weight of {name} above 1.0",
                c.name
            );
        }
    }

    check_grades(&parsed, &course)?;
    let mut final_grades = Vec::new();
    for s in &parsed.students {
        if let Some(letter) = &s.final_grade {
            let grade: FinalGrade = letter
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{}", e))
                .with_context(|| format!("final grade for {}", s.username))?;
            final_grades.push((s.username.as_str(), grade));
        }
    }

    for s in &parsed.students {
        if !model.student_exists(&s.username) {
            model.add_student(Student::new(
                s.username.as_str(),
                s.first_name.as_str(),
                s.last_name.as_str(),
            ));
        }
        let student = model
            .student_mut(&s.username)
            .with_context(|| format!("student {} vanished from the registry", s.username))?;
        course.add_student(student);
    }

    for a in &parsed.assignments {
        for (username, points) in &a.grades {
            let student = model
                .student_mut(username)
                .with_context(|| format!("{} grades unlisted student {username}", a.title))?;
            course
                .assign_grade(&a.title, student, *points)
                .with_context(|| format!("grade for {username} on {}", a.title))?;
        }
    }

    for (username, grade) in final_grades {
        let student = model
            .student_mut(username)
            .with_context(|| format!("student {username} vanished from the registry"))?;
        course.assign_final_grade(student, grade)?;
    }

    if let Some(t) = parsed.teacher {
        if !model.teacher_exists(&t.username) {
            model.add_teacher(Teacher::new(
                t.username.as_str(),
                t.first_name.as_str(),
                t.last_name.as_str(),
            ));
        }
        if let Some(teacher) = model.teacher_mut(&t.username) {
            teacher.add_course(&name);
        }
    }

    model.add_course(course);
    Ok(name)
}

/// Replay every grade against scratch copies of the assignments, so a bad
/// entry fails the load before any registered student is touched.
fn check_grades(parsed: &TomlCourseFile, course: &Course) -> Result<()> {
    let listed: HashSet<&str> = parsed.students.iter().map(|s| s.username.as_str()).collect();
    for a in &parsed.assignments {
        let Some(assignment) = course.assignment(&a.title) else {
            continue;
        };
        let mut scratch = assignment.clone();
        for (username, points) in &a.grades {
            if !listed.contains(username.as_str()) {
                anyhow::bail!("{} grades unlisted student {username}", a.title);
            }
            let mut student = Student::new(username.as_str(), "", "");
            scratch
                .assign_grade(&mut student, *points)
                .with_context(|| format!("grade for {username} on {}", a.title))?;
        }
    }
    Ok(())
}

/// Recursively load all `.toml` course files from a directory.
pub fn load_course_directory(dir: &Path, model: &mut GradebookModel) -> Result<Vec<String>> {
    let mut names = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            names.extend(load_course_directory(&path, model)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_course_file(&path, model) {
                Ok(name) => names.push(name),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(names)
}

/// Load a file or a directory of course files. Returns the loaded names.
pub fn load_courses(path: &Path, model: &mut GradebookModel) -> Result<Vec<String>> {
    if path.is_dir() {
        load_course_directory(path, model)
    } else {
        Ok(vec![parse_course_file(path, model)?])
    }
}

/// Serialize a course, and the people in it, back to course-file TOML.
pub fn write_course_str(course: &Course, model: &GradebookModel) -> Result<String> {
    let teacher = model
        .teachers()
        .into_iter()
        .find(|t| t.teaching_courses().iter().any(|c| c == course.name()))
        .map(|t| person_to_toml(t.person()));

    let students = course
        .students()
        .iter()
        .map(|p| TomlStudent {
            username: p.username().to_string(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            final_grade: course.final_grade(&p.id).map(|g| g.to_string()),
        })
        .collect();

    let assignments = course
        .assignments()
        .iter()
        .map(|a| TomlAssignment {
            title: a.title().to_string(),
            max_points: a.max_points(),
            grades: a
                .grades()
                .iter()
                .filter(|(id, _)| course.is_enrolled(id))
                .map(|(id, g)| (id.to_string(), g.points_received()))
                .collect(),
        })
        .collect();

    let categories = course
        .categories()
        .iter()
        .map(|c| TomlCategory {
            name: c.name().to_string(),
            weight: c.weight(),
            drop_lowest: c.drop_lowest_count(),
            assignments: c.assignments().to_vec(),
        })
        .collect();

    let file = TomlCourseFile {
        course: TomlCourseHeader {
            name: course.name().to_string(),
            grading_mode: Some(course.grading_mode().to_string()),
            assignments_to_drop: course.assignments_to_drop(),
        },
        teacher,
        students,
        assignments,
        categories,
    };

    toml::to_string_pretty(&file).context("failed to serialize course")
}

/// Write a course file to disk, creating parent directories as needed.
pub fn save_course_file(course: &Course, model: &GradebookModel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = write_course_str(course, model)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write course file: {}", path.display()))?;
    Ok(())
}

fn person_to_toml(person: &Person) -> TomlPerson {
    TomlPerson {
        username: person.username().to_string(),
        first_name: person.first_name.clone(),
        last_name: person.last_name.clone(),
    }
}

/// Read a roster file of `username,first_name,last_name` lines.
///
/// Blank lines and lines with fewer than three fields are skipped; any
/// further fields are ignored.
pub fn import_roster(path: &Path) -> Result<Vec<Person>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster: {}", path.display()))?;

    let mut people = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 3 || fields[0].is_empty() {
            tracing::warn!("{}:{}: skipping malformed roster line", path.display(), number + 1);
            continue;
        }
        people.push(Person::new(fields[0], fields[1], fields[2]));
    }
    Ok(people)
}

/// A warning from course validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The assignment or category concerned (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a course's grading setup for common mistakes.
pub fn validate_course(course: &Course) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Assignments that no category counts, or that several categories count
    for assignment in course.assignments() {
        let owners = course
            .categories()
            .iter()
            .filter(|c| c.contains(assignment.title()))
            .count();
        let message = match owners {
            0 => "assignment is in no category and does not count toward the average",
            1 => continue,
            _ => "assignment is in more than one category and counts more than once",
        };
        warnings.push(ValidationWarning {
            subject: Some(assignment.title().to_string()),
            message: message.into(),
        });
    }

    // Duplicate category names (lookups ignore case)
    let mut seen = HashSet::new();
    for category in course.categories() {
        if !seen.insert(category.name().to_lowercase()) {
            warnings.push(ValidationWarning {
                subject: Some(category.name().to_string()),
                message: format!("duplicate category name: {}", category.name()),
            });
        }
    }

    // Weighted mode only reaches 100% when the weights cover everything
    if course.grading_mode() == GradingMode::Weighted {
        let total: f64 = course.categories().iter().map(Category::weight).sum();
        if (total - 1.0).abs() > 1e-9 {
            warnings.push(ValidationWarning {
                subject: None,
                message: format!("category weights sum to {total:.2}, not 1.00"),
            });
        }
    }

    // Drop counts that discard every grade in the category
    for category in course.categories() {
        let count = category.assignments().len();
        if category.drop_lowest_count() > 0 && category.drop_lowest_count() >= count {
            warnings.push(ValidationWarning {
                subject: Some(category.name().to_string()),
                message: format!(
                    "drops {} of {} assignments, so the category always averages 0",
                    category.drop_lowest_count(),
                    count
                ),
            });
        }
    }

    if course.assignments_to_drop() > 0 {
        warnings.push(ValidationWarning {
            subject: None,
            message: "assignments_to_drop is ignored; set drop_lowest on a category instead".into(),
        });
    }

    warnings
}
