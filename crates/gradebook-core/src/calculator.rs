//! Stateless grade statistics.
//!
//! These work on plain slices and are shared by categories, courses,
//! students, and reports.

use crate::assignment::Assignment;
use crate::category::Category;
use crate::grade::{FinalGrade, Grade};
use crate::student::StudentId;

/// Mean percentage of the grades, 0.0 for an empty slice.
pub fn calculate_average(grades: &[Grade]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    grades.iter().map(Grade::percentage).sum::<f64>() / grades.len() as f64
}

/// Median percentage of the grades, 0.0 for an empty slice.
pub fn calculate_median(grades: &[Grade]) -> f64 {
    let values: Vec<f64> = grades.iter().map(Grade::percentage).collect();
    median(&values)
}

/// Median of raw values. Even counts average the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean grade points of the final grades, 0.0 for an empty slice.
pub fn calculate_gpa(final_grades: &[FinalGrade]) -> f64 {
    let points: Vec<f64> = final_grades.iter().map(|g| g.gpa_value()).collect();
    mean(&points)
}

/// Letter for a percentage: 90 and up is A, 80 B, 70 C, 60 D, below that E.
pub fn letter_grade(percentage: f64) -> FinalGrade {
    FinalGrade::from_percentage(percentage)
}

/// `sum(category average * weight) / sum(weight)` across categories.
///
/// The category average is [`Category::calculate_category_average`], which
/// already carries the weight, so each weight counts twice here. This is not
/// the course's weighted-mode average; use
/// [`Course::calculate_student_average`](crate::course::Course::calculate_student_average)
/// for that. Returns 0.0 when there are no categories or the total weight is 0.
pub fn calculate_weighted_average(
    categories: &[Category],
    assignments: &[Assignment],
    student: &StudentId,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for category in categories {
        weighted_sum +=
            category.calculate_category_average(student, assignments) * category.weight();
        total_weight += category.weight();
    }
    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

/// Remove the `drop_count` lowest grades by percentage.
///
/// The survivors come back sorted ascending. The sort is stable, so among
/// equal percentages the grade that appears first in `grades` is dropped
/// first. A `drop_count` of 0 returns the input unchanged, in its original
/// order.
pub fn drop_lowest_grades(grades: &[Grade], drop_count: usize) -> Vec<Grade> {
    if drop_count == 0 {
        return grades.to_vec();
    }
    if drop_count >= grades.len() {
        return Vec::new();
    }
    let mut sorted = grades.to_vec();
    sorted.sort_by(|a, b| a.percentage().total_cmp(&b.percentage()));
    sorted.split_off(drop_count)
}
