//! The `gradebook compare` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::config::load_config_from;
use gradebook_core::report::CourseReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: Option<f64>,
    fail_on_regression: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let threshold = threshold.unwrap_or(config.regression_threshold);

    let baseline = CourseReport::load_json(&baseline_path)?;
    let current = CourseReport::load_json(&current_path)?;
    if baseline.course != current.course {
        tracing::warn!(
            "comparing reports for different courses: {} vs {}",
            baseline.course,
            current.course
        );
    }

    let report = current.compare(&baseline, threshold);
    let decimals = config.decimal_places;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );
            println!(
                "Class average: {} -> {}",
                super::percent(report.baseline_class_average, decimals),
                super::percent(report.current_class_average, decimals)
            );

            for (title, changes) in [
                ("Regressions", &report.regressions),
                ("Improvements", &report.improvements),
            ] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} {} -> {} ({:+.decimals$})",
                        c.username,
                        super::percent(c.baseline_average, decimals),
                        super::percent(c.current_average, decimals),
                        c.delta
                    );
                }
            }

            if !report.new_students.is_empty() {
                println!("\n{} new student(s)", report.new_students.len());
            }
            if !report.removed_students.is_empty() {
                println!("{} removed student(s)", report.removed_students.len());
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
