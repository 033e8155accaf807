//! The `gradebook grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradebook_core::parser::save_course_file;

pub fn execute(course_path: PathBuf, assignment: String, student: String, points: f64) -> Result<()> {
    let (mut model, name) = super::load_one(&course_path)?;

    let grade = model
        .assign_grade(&name, &assignment, &student, points)
        .with_context(|| format!("cannot grade {student} on {assignment}"))?;

    let course = model
        .course(&name)
        .with_context(|| format!("course {name} missing after load"))?;
    save_course_file(course, &model, &course_path)?;

    println!(
        "{student}: {assignment} = {}/{} ({:.2}%)",
        grade.points_received(),
        grade.max_points(),
        grade.percentage()
    );
    println!(
        "Course average for {student}: {:.2}%",
        course.calculate_student_average(&student.as_str().into())
    );

    Ok(())
}
