use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradebook_core::calculator::{calculate_median, drop_lowest_grades};
use gradebook_core::{Assignment, Category, Course, Grade, GradingMode, Student};

fn grades(n: usize) -> Vec<Grade> {
    (0..n)
        .filter_map(|i| Grade::new((i * 37 % 101) as f64, 100.0).ok())
        .collect()
}

/// 40 students, 4 categories of 10 assignments each, everything graded.
fn large_course(mode: GradingMode) -> Course {
    let mut course = Course::new("BENCH101");
    course.set_grading_mode(mode);
    let mut students: Vec<Student> = (0..40)
        .map(|i| Student::new(format!("s{i}"), "First", format!("Last{i}")))
        .collect();
    for s in &mut students {
        course.add_student(s);
    }

    for (c, name) in ["Homework", "Labs", "Quizzes", "Exams"].iter().enumerate() {
        let Ok(mut category) = Category::new(*name, 0.25) else {
            continue;
        };
        category.set_drop_lowest_count(2);
        for a in 0..10 {
            let title = format!("{name}{a}");
            if let Ok(assignment) = Assignment::new(title.as_str(), 50.0, &course) {
                category.add_assignment(&assignment);
                course.add_assignment(assignment);
            }
            for (i, s) in students.iter_mut().enumerate() {
                // 0..=50 on a 50 point assignment
                let points = ((i + a + c) * 7 % 51) as f64;
                if let Err(e) = course.assign_grade(&title, s, points) {
                    panic!("fixture grade for {title} rejected: {e}");
                }
            }
        }
        course.add_category(category);
    }
    course
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    let small = grades(10);
    let big = grades(1_000);

    group.bench_function("drop_lowest/10", |b| {
        b.iter(|| drop_lowest_grades(black_box(&small), black_box(2)))
    });
    group.bench_function("drop_lowest/1000", |b| {
        b.iter(|| drop_lowest_grades(black_box(&big), black_box(50)))
    });
    group.bench_function("median/1000", |b| {
        b.iter(|| calculate_median(black_box(&big)))
    });

    group.finish();
}

fn bench_class_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_average");

    let total = large_course(GradingMode::TotalPoints);
    let weighted = large_course(GradingMode::Weighted);

    group.bench_function("total_points", |b| {
        b.iter(|| black_box(&total).calculate_class_average())
    });
    group.bench_function("weighted", |b| {
        b.iter(|| black_box(&weighted).calculate_class_average())
    });

    group.finish();
}

criterion_group!(benches, bench_primitives, bench_class_average);
criterion_main!(benches);
