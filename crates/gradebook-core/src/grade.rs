//! Per-assignment grades and final letter grades.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradebookError, Result};

/// Points earned on one assignment, out of that assignment's maximum.
///
/// Always satisfies `0 <= points_received <= max_points` and `max_points > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grade {
    points_received: f64,
    max_points: f64,
}

impl Grade {
    pub fn new(points_received: f64, max_points: f64) -> Result<Self> {
        // NaN fails every comparison below, so it is rejected as well.
        let valid = max_points > 0.0
            && max_points.is_finite()
            && points_received >= 0.0
            && points_received <= max_points;
        if !valid {
            return Err(GradebookError::InvalidGrade {
                points: points_received,
                max_points,
            });
        }
        Ok(Self {
            points_received,
            max_points,
        })
    }

    pub fn points_received(&self) -> f64 {
        self.points_received
    }

    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    /// Score as a percentage in `[0, 100]`.
    pub fn percentage(&self) -> f64 {
        self.points_received / self.max_points * 100.0
    }
}

/// Final letter grade recorded for a student in a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FinalGrade {
    A,
    B,
    C,
    D,
    E,
}

impl FinalGrade {
    /// All letters, best first.
    pub const ALL: [FinalGrade; 5] = [
        FinalGrade::A,
        FinalGrade::B,
        FinalGrade::C,
        FinalGrade::D,
        FinalGrade::E,
    ];

    /// Grade points on a 4.0 scale.
    pub fn gpa_value(self) -> f64 {
        match self {
            FinalGrade::A => 4.0,
            FinalGrade::B => 3.0,
            FinalGrade::C => 2.0,
            FinalGrade::D => 1.0,
            FinalGrade::E => 0.0,
        }
    }

    /// Map a percentage onto a letter. Lower bounds are inclusive.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => FinalGrade::A,
            p if p >= 80.0 => FinalGrade::B,
            p if p >= 70.0 => FinalGrade::C,
            p if p >= 60.0 => FinalGrade::D,
            _ => FinalGrade::E,
        }
    }
}

impl fmt::Display for FinalGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            FinalGrade::A => "A",
            FinalGrade::B => "B",
            FinalGrade::C => "C",
            FinalGrade::D => "D",
            FinalGrade::E => "E",
        };
        f.write_str(letter)
    }
}

impl FromStr for FinalGrade {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(FinalGrade::A),
            "B" => Ok(FinalGrade::B),
            "C" => Ok(FinalGrade::C),
            "D" => Ok(FinalGrade::D),
            "E" => Ok(FinalGrade::E),
            other => Err(format!("unknown final grade: {other}")),
        }
    }
}
