//! The `gradebook transcript` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::report::Transcript;

pub fn execute(
    course_path: Option<PathBuf>,
    student: String,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let loaded = super::load(course_path, config_path)?;
    let transcript = Transcript::build(&loaded.model, &student)?;
    let pct = |v: f64| super::percent(v, loaded.config.decimal_places);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&transcript)?),
        "markdown" | "md" => println!("{}", transcript.to_markdown()),
        _ => {
            println!("Transcript: {} ({})\n", transcript.name, transcript.username);
            let mut table = Table::new();
            table.set_header(vec!["Course", "Average", "Letter", "Final", "Graded"]);
            for c in &transcript.courses {
                table.add_row(vec![
                    Cell::new(&c.course),
                    Cell::new(pct(c.average)),
                    Cell::new(c.letter),
                    Cell::new(c.final_grade.map_or_else(|| "-".to_string(), |g| g.to_string())),
                    Cell::new(format!("{}/{}", c.graded, c.total)),
                ]);
            }
            println!("{table}");
            println!("\nGPA: {:.2}", transcript.gpa);
        }
    }

    Ok(())
}
