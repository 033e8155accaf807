//! The `gradebook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create gradebook.toml
    if std::path::Path::new("gradebook.toml").exists() {
        println!("gradebook.toml already exists, skipping.");
    } else {
        std::fs::write("gradebook.toml", SAMPLE_CONFIG)?;
        println!("Created gradebook.toml");
    }

    // Create example course
    std::fs::create_dir_all("courses")?;
    let example_path = std::path::Path::new("courses/example.toml");
    if example_path.exists() {
        println!("courses/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_COURSE)?;
        println!("Created courses/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit courses/example.toml with your roster and assignments");
    println!("  2. Run: gradebook validate --course courses/example.toml");
    println!("  3. Run: gradebook report --course courses/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

course_dir = "./courses"
output_dir = "./gradebook-reports"
decimal_places = 2

# Percentage points a student's average may move before `compare` reports it
regression_threshold = 2.0
"#;

const EXAMPLE_COURSE: &str = r#"[course]
name = "EXAMPLE101"
grading_mode = "weighted"

[teacher]
username = "teacher1"
first_name = "Alice"
last_name = "Smith"

[[students]]
username = "s123"
first_name = "Alina"
last_name = "Kushareva"

[[students]]
username = "s124"
first_name = "John"
last_name = "Doe"

[[assignments]]
title = "HW1"
max_points = 10.0
[assignments.grades]
s123 = 9.0
s124 = 7.0

[[assignments]]
title = "HW2"
max_points = 10.0
[assignments.grades]
s123 = 6.0
s124 = 8.0

[[assignments]]
title = "Midterm"
max_points = 100.0
[assignments.grades]
s123 = 88.0
s124 = 74.0

[[categories]]
name = "Homework"
weight = 0.4
drop_lowest = 1
assignments = ["HW1", "HW2"]

[[categories]]
name = "Exams"
weight = 0.6
assignments = ["Midterm"]
"#;
