//! Aggregates over student sets.

use std::collections::BTreeMap;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::domain::{Gender, Student};

/// Aggregates over a set of students.
///
/// Averages and ranges are `None` for an empty set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStats {
    pub count: usize,
    pub average_age: Option<f64>,
    pub age_range: Option<(u8, u8)>,
    pub average_grade: Option<f64>,
    pub grade_range: Option<(u8, u8)>,
    pub genders: BTreeMap<Gender, usize>,
}

impl StudentStats {
    pub fn from_students<'a>(students: impl IntoIterator<Item = &'a Student>) -> Self {
        let students: Vec<&Student> = students.into_iter().collect();
        let ages = || students.iter().map(|s| s.age);
        let grades = || students.iter().map(|s| s.grade);

        Self {
            count: students.len(),
            average_age: average(ages()),
            age_range: range(ages()),
            average_grade: average(grades()),
            grade_range: range(grades()),
            genders: students.iter().map(|s| s.gender).counts().into_iter().collect(),
        }
    }
}

/// Dataset-wide counts plus student aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub colleges: usize,
    pub departments: usize,
    pub classes: usize,
    pub students: StudentStats,
}

fn average(values: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, n) = values.fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

fn range(values: impl Iterator<Item = u8>) -> Option<(u8, u8)> {
    match values.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: u32, age: u8, gender: Gender, grade: u8) -> Student {
        Student {
            id,
            name: format!("s{id}"),
            age,
            gender,
            grade,
        }
    }

    #[test]
    fn empty_set_has_no_averages() {
        let stats = StudentStats::from_students(&Vec::<Student>::new());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average_age, None);
        assert_eq!(stats.grade_range, None);
        assert!(stats.genders.is_empty());
    }

    #[test]
    fn aggregates_ages_grades_and_genders() {
        let students = [
            student(1, 20, Gender::Female, 90),
            student(2, 22, Gender::Male, 70),
            student(3, 21, Gender::Female, 80),
        ];

        let stats = StudentStats::from_students(&students);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.average_age, Some(21.0));
        assert_eq!(stats.age_range, Some((20, 22)));
        assert_eq!(stats.average_grade, Some(80.0));
        assert_eq!(stats.grade_range, Some((70, 90)));
        assert_eq!(stats.genders.get(&Gender::Female), Some(&2));
        assert_eq!(stats.genders.get(&Gender::Male), Some(&1));
        assert_eq!(stats.genders.get(&Gender::Other), None);
    }

    #[test]
    fn single_student_range_is_degenerate() {
        let stats = StudentStats::from_students(&[student(1, 19, Gender::Other, 55)]);
        assert_eq!(stats.age_range, Some((19, 19)));
    }
}
