//! gradebook CLI: course reports, transcripts, and course file maintenance.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Course grade aggregation and reporting")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a grade report for one or more courses
    Report {
        /// Course file or directory (default: course_dir from config)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the JSON report to this file (a directory when reporting several courses)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save the JSON report under output_dir from config
        #[arg(long)]
        save: bool,
    },

    /// Print one student's transcript across courses
    Transcript {
        /// Course file or directory (default: course_dir from config)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Student username
        #[arg(long)]
        student: String,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compare two saved course reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Percentage points an average may move before it counts
        #[arg(long)]
        threshold: Option<f64>,

        /// Exit code 1 if any average dropped
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Record a grade in a course file
    Grade {
        /// Course file
        #[arg(long)]
        course: PathBuf,

        /// Assignment title
        #[arg(long)]
        assignment: String,

        /// Student username
        #[arg(long)]
        student: String,

        /// Points received
        #[arg(long)]
        points: f64,
    },

    /// Enroll every student listed in a roster file
    Enroll {
        /// Course file
        #[arg(long)]
        course: PathBuf,

        /// Roster file of `username,first_name,last_name` lines
        #[arg(long)]
        roster: PathBuf,
    },

    /// Validate course files
    Validate {
        /// Course file or directory (default: course_dir from config)
        #[arg(long)]
        course: Option<PathBuf>,
    },

    /// Create starter config and example course
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gradebook=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Report {
            course,
            format,
            output,
            save,
        } => commands::report::execute(course, format, output, save, config),
        Commands::Transcript {
            course,
            student,
            format,
        } => commands::transcript::execute(course, student, format, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
            config,
        ),
        Commands::Grade {
            course,
            assignment,
            student,
            points,
        } => commands::grade::execute(course, assignment, student, points),
        Commands::Enroll { course, roster } => commands::enroll::execute(course, roster),
        Commands::Validate { course } => commands::validate::execute(course, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
