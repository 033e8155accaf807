pub mod compare;
pub mod enroll;
pub mod grade;
pub mod init;
pub mod report;
pub mod transcript;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use gradebook_core::config::{load_config_from, GradebookConfig};
use gradebook_core::parser::load_courses;
use gradebook_core::GradebookModel;

/// Courses loaded for a read-only command.
pub struct Loaded {
    pub config: GradebookConfig,
    pub model: GradebookModel,
    /// Course names in load order.
    pub courses: Vec<String>,
}

/// Read the config, then load `course` (or the configured course directory).
pub fn load(course: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Loaded> {
    let config = load_config_from(config_path.as_deref())?;
    let path = course.unwrap_or_else(|| config.course_dir.clone());

    let mut model = GradebookModel::new();
    let courses = load_courses(&path, &mut model)?;
    if courses.is_empty() {
        anyhow::bail!("no course files found in {}", path.display());
    }
    tracing::debug!(count = courses.len(), path = %path.display(), "courses loaded");

    Ok(Loaded {
        config,
        model,
        courses,
    })
}

/// Load a single course file for editing. Returns the model and course name.
pub fn load_one(path: &Path) -> Result<(GradebookModel, String)> {
    let mut model = GradebookModel::new();
    let name = gradebook_core::parser::parse_course_file(path, &mut model)?;
    Ok((model, name))
}

/// Format a percentage with the configured number of decimals.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}
