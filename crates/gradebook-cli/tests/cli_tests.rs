//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CSC335: &str = "../../courses/csc335.toml";
const COURSES: &str = "../../courses";

fn gradebook() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("gradebook").unwrap()
}

/// Copy the CSC335 sample into a temp dir so commands can rewrite it.
fn scratch_course(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("csc335.toml");
    std::fs::copy(CSC335, &path).unwrap();
    path
}

fn report_json(course: &Path) -> serde_json::Value {
    let output = gradebook()
        .arg("report")
        .arg("--course")
        .arg(course)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn student_average(report: &serde_json::Value, username: &str) -> f64 {
    report["students"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["username"] == username)
        .and_then(|s| s["average"].as_f64())
        .unwrap()
}

#[test]
fn validate_sample_course() {
    gradebook()
        .arg("validate")
        .arg("--course")
        .arg(CSC335)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CSC335 (4 students, 5 assignments, 2 categories)",
        ))
        .stdout(predicate::str::contains("All courses valid"));
}

#[test]
fn validate_directory() {
    gradebook()
        .arg("validate")
        .arg("--course")
        .arg(COURSES)
        .assert()
        .success()
        .stdout(predicate::str::contains("CSC335"))
        .stdout(predicate::str::contains("MATH101"));
}

#[test]
fn validate_nonexistent_file() {
    gradebook()
        .arg("validate")
        .arg("--course")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loose.toml");
    std::fs::write(
        &path,
        r#"
[course]
name = "LOOSE"

[[assignments]]
title = "Essay"
max_points = 50.0
"#,
    )
    .unwrap();

    gradebook()
        .arg("validate")
        .arg("--course")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Essay] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn report_text_table() {
    gradebook()
        .arg("report")
        .arg("--course")
        .arg(CSC335)
        .assert()
        .success()
        .stdout(predicate::str::contains("=== CSC335 (weighted) ==="))
        .stdout(predicate::str::contains("akush"))
        .stdout(predicate::str::contains("95.80%"))
        .stdout(predicate::str::contains("Class average: 82.25%"))
        .stdout(predicate::str::contains("Class median: 81.55%"));
}

#[test]
fn report_json_is_machine_readable() {
    let report = report_json(Path::new(CSC335));

    assert_eq!(report["course"], "CSC335");
    assert_eq!(report["grading_mode"], "weighted");
    assert!((report["class_average"].as_f64().unwrap() - 82.25).abs() < 1e-9);

    let students = report["students"].as_array().unwrap();
    assert_eq!(students.len(), 4);
    // Sorted by last name: Chen, Diaz, Kushareva, Okafor.
    assert_eq!(students[0]["username"], "bchen");
    assert_eq!(students[2]["final_grade"], "A");
    assert!((student_average(&report, "cdiaz") - 70.1).abs() < 1e-9);

    let assignments = report["assignments"].as_array().unwrap();
    let final_exam = assignments.iter().find(|a| a["title"] == "Final").unwrap();
    assert_eq!(final_exam["graded_count"], 0);
}

#[test]
fn report_markdown() {
    gradebook()
        .arg("report")
        .arg("--course")
        .arg(CSC335)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("## CSC335"))
        .stdout(predicate::str::contains("| akush | Alina Kushareva |"));
}

#[test]
fn report_saves_json() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("reports").join("csc335.json");

    gradebook()
        .arg("report")
        .arg("--course")
        .arg(CSC335)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["course"], "CSC335");
}

#[test]
fn report_save_uses_configured_output_dir() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("gradebook.toml");
    let out_dir = dir.path().join("archive");
    std::fs::write(
        &config,
        format!("output_dir = {:?}\n", out_dir.to_string_lossy()),
    )
    .unwrap();

    gradebook()
        .arg("report")
        .arg("--course")
        .arg(CSC335)
        .arg("--save")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let saved: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn compare_identical_reports() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("baseline.json");
    gradebook()
        .args(["report", "--course", CSC335, "--output"])
        .arg(&out)
        .assert()
        .success();

    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg(&out)
        .arg("--current")
        .arg(&out)
        .arg("--fail-on-regression")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0 regressions, 0 improvements, 4 unchanged",
        ));
}

#[test]
fn compare_detects_lowered_grade() {
    let dir = TempDir::new().unwrap();
    let course = scratch_course(&dir);
    let baseline = dir.path().join("baseline.json");
    let current = dir.path().join("current.json");

    gradebook()
        .arg("report")
        .arg("--course")
        .arg(&course)
        .arg("--output")
        .arg(&baseline)
        .assert()
        .success();

    gradebook()
        .arg("grade")
        .arg("--course")
        .arg(&course)
        .args(["--assignment", "Midterm", "--student", "cdiaz", "--points", "40"])
        .assert()
        .success();

    gradebook()
        .arg("report")
        .arg("--course")
        .arg(&course)
        .arg("--output")
        .arg(&current)
        .assert()
        .success();

    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&current)
        .arg("--fail-on-regression")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Regressions:"))
        .stdout(predicate::str::contains("cdiaz"));
}

#[test]
fn compare_missing_report() {
    gradebook()
        .arg("compare")
        .arg("--baseline")
        .arg("missing-baseline.json")
        .arg("--current")
        .arg("missing-current.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}

#[test]
fn transcript_spans_courses() {
    gradebook()
        .arg("transcript")
        .arg("--course")
        .arg(COURSES)
        .arg("--student")
        .arg("akush")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alina Kushareva"))
        .stdout(predicate::str::contains("CSC335"))
        .stdout(predicate::str::contains("MATH101"))
        .stdout(predicate::str::contains("83.00%"))
        .stdout(predicate::str::contains("GPA: 3.50"));
}

#[test]
fn transcript_unknown_student() {
    gradebook()
        .arg("transcript")
        .arg("--course")
        .arg(CSC335)
        .arg("--student")
        .arg("nobody")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown student: nobody"));
}

#[test]
fn grade_updates_course_file() {
    let dir = TempDir::new().unwrap();
    let course = scratch_course(&dir);

    gradebook()
        .arg("grade")
        .arg("--course")
        .arg(&course)
        .args(["--assignment", "Final", "--student", "akush", "--points", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("akush: Final = 150/150 (100.00%)"));

    // Exams now average (94 + 100) / 2 = 97: 30 + 97 * 0.7
    let report = report_json(&course);
    assert!((student_average(&report, "akush") - 97.9).abs() < 1e-9);
}

#[test]
fn grade_rejects_points_above_maximum() {
    let dir = TempDir::new().unwrap();
    let course = scratch_course(&dir);
    let before = std::fs::read_to_string(&course).unwrap();

    gradebook()
        .arg("grade")
        .arg("--course")
        .arg(&course)
        .args(["--assignment", "HW1", "--student", "akush", "--points", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("points exceed maximum"));

    assert_eq!(std::fs::read_to_string(&course).unwrap(), before);
}

#[test]
fn grade_requires_enrollment() {
    let dir = TempDir::new().unwrap();
    let course = scratch_course(&dir);

    gradebook()
        .arg("grade")
        .arg("--course")
        .arg(&course)
        .args(["--assignment", "HW1", "--student", "ghost", "--points", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown student: ghost"));
}

#[test]
fn enroll_from_roster() {
    let dir = TempDir::new().unwrap();
    let course = scratch_course(&dir);
    let roster = dir.path().join("roster.csv");
    std::fs::write(&roster, "fnew,Fatima,Newton\n\nakush,Alina,Kushareva\nbroken\n").unwrap();

    gradebook()
        .arg("enroll")
        .arg("--course")
        .arg(&course)
        .arg("--roster")
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("akush already enrolled, skipping."))
        .stdout(predicate::str::contains(
            "Enrolled 1 student(s) in CSC335 (5 total).",
        ));

    let report = report_json(&course);
    assert_eq!(report["students"].as_array().unwrap().len(), 5);
    assert_eq!(student_average(&report, "fnew"), 0.0);
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gradebook.toml"))
        .stdout(predicate::str::contains("Created courses/example.toml"));

    assert!(dir.path().join("gradebook.toml").exists());
    assert!(dir.path().join("courses/example.toml").exists());

    // The generated course is valid and found through the generated config.
    gradebook()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("EXAMPLE101"))
        .stdout(predicate::str::contains("All courses valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gradebook.toml"), "# existing").unwrap();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("gradebook.toml")).unwrap(),
        "# existing"
    );
}

#[test]
fn help_lists_commands() {
    gradebook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("transcript"))
        .stdout(predicate::str::contains("compare"));
}
