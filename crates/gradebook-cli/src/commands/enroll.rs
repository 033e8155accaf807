//! The `gradebook enroll` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradebook_core::parser::{import_roster, save_course_file};
use gradebook_core::Student;

pub fn execute(course_path: PathBuf, roster_path: PathBuf) -> Result<()> {
    let (mut model, name) = super::load_one(&course_path)?;
    let people = import_roster(&roster_path)?;

    let mut enrolled = 0;
    for person in people {
        let username = person.username().to_string();
        if !model.student_exists(&username) {
            model.add_student(Student::from_person(person));
        }
        if model.enroll(&name, &username)? {
            enrolled += 1;
        } else {
            println!("{username} already enrolled, skipping.");
        }
    }

    let course = model
        .course(&name)
        .with_context(|| format!("course {name} missing after load"))?;
    save_course_file(course, &model, &course_path)?;

    println!(
        "Enrolled {enrolled} student(s) in {name} ({} total).",
        course.students().len()
    );

    Ok(())
}
