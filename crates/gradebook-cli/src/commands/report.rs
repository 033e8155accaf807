//! The `gradebook report` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::report::CourseReport;

pub fn execute(
    course_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let loaded = super::load(course_path, config_path)?;

    let reports: Vec<CourseReport> = loaded
        .courses
        .iter()
        .filter_map(|name| loaded.model.course(name))
        .map(|course| CourseReport::build(course, &loaded.model))
        .collect();

    match format.as_str() {
        "json" => {
            if let [single] = reports.as_slice() {
                println!("{}", serde_json::to_string_pretty(single)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }
        "markdown" | "md" => {
            for report in &reports {
                println!("{}", report.to_markdown());
            }
        }
        _ => {
            for report in &reports {
                print_report(report, loaded.config.decimal_places);
            }
        }
    }

    if let Some(path) = output {
        if let [single] = reports.as_slice() {
            single.save_json(&path)?;
            eprintln!("Report saved to {}", path.display());
        } else {
            save_all(&reports, &path)?;
        }
    }

    if save {
        save_all(&reports, &loaded.config.output_dir)?;
    }

    Ok(())
}

fn save_all(reports: &[CourseReport], dir: &Path) -> Result<()> {
    for report in reports {
        let path = dir.join(report_file_name(report));
        report.save_json(&path)?;
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}

/// `<course>-<timestamp>.json` with anything but letters and digits in the
/// course name replaced.
fn report_file_name(report: &CourseReport) -> String {
    let course: String = report
        .course
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!(
        "{}-{}.json",
        course,
        report.created_at.format("%Y%m%d-%H%M%S")
    )
}

fn print_report(report: &CourseReport, decimals: usize) {
    let pct = |v: f64| super::percent(v, decimals);

    println!("\n=== {} ({}) ===\n", report.course, report.grading_mode);

    let mut table = Table::new();
    table.set_header(vec!["Student", "Name", "Average", "Simple", "Letter", "Final"]);
    for s in &report.students {
        table.add_row(vec![
            Cell::new(&s.username),
            Cell::new(&s.name),
            Cell::new(pct(s.average)),
            Cell::new(pct(s.simple_average)),
            Cell::new(s.letter),
            Cell::new(s.final_grade.map_or_else(|| "-".to_string(), |g| g.to_string())),
        ]);
    }
    println!("{table}");

    if !report.assignments.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Assignment", "Max", "Graded", "Average", "Median"]);
        for a in &report.assignments {
            table.add_row(vec![
                Cell::new(&a.title),
                Cell::new(a.max_points),
                Cell::new(format!("{}/{}", a.graded_count, report.students.len())),
                Cell::new(pct(a.average_percent)),
                Cell::new(pct(a.median_percent)),
            ]);
        }
        println!("\n{table}");
    }

    println!(
        "\nClass average: {}  Class median: {}",
        pct(report.class_average),
        pct(report.class_median)
    );
}
