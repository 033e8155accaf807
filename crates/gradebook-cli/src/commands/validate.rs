//! The `gradebook validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::parser::validate_course;

pub fn execute(course_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let loaded = super::load(course_path, config_path)?;

    let mut total_warnings = 0;

    for name in &loaded.courses {
        let Some(course) = loaded.model.course(name) else {
            continue;
        };
        println!(
            "Course: {} ({} students, {} assignments, {} categories)",
            course.name(),
            course.students().len(),
            course.assignments().len(),
            course.categories().len()
        );

        let warnings = validate_course(course);
        for w in &warnings {
            let prefix = w
                .subject
                .as_ref()
                .map(|s| format!("  [{s}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All courses valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
