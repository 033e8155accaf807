//! Gradebook configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level gradebook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Decimal places shown for averages in tables.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
    /// Where course files live.
    #[serde(default = "default_course_dir")]
    pub course_dir: PathBuf,
    /// Where reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Percentage points a student's average may move before `compare`
    /// reports it.
    #[serde(default = "default_regression_threshold")]
    pub regression_threshold: f64,
}

fn default_decimal_places() -> usize {
    2
}
fn default_course_dir() -> PathBuf {
    PathBuf::from("./courses")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./gradebook-reports")
}
fn default_regression_threshold() -> f64 {
    2.0
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            course_dir: default_course_dir(),
            output_dir: default_output_dir(),
            regression_threshold: default_regression_threshold(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// Environment variable overrides: `GRADEBOOK_COURSE_DIR`, `GRADEBOOK_OUTPUT_DIR`.
pub fn load_config() -> Result<GradebookConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradebook.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradebookConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradebookConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("GRADEBOOK_COURSE_DIR") {
        config.course_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("GRADEBOOK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.course_dir = resolve_path(&config.course_dir);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}
