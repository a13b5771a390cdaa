use super::Level;
use crate::settings::{settings, GradeBand};

const FALLBACK_GRADE: (&str, &str) = ("C", "#f43f5e");

pub fn section_feedback(section: &str, level: Level) -> &'static str {
    let s = settings();
    s.section(section)
        .map(|spec| spec.feedback.for_level(level))
        .unwrap_or(s.feedback_fallback.as_str())
}

/// Scans the grade table from the highest threshold down; the first band whose
/// inclusive lower bound is met wins. Totals below every threshold fall into
/// the last band.
pub fn grade_band(total: f64) -> Option<&'static GradeBand> {
    let grades = &settings().grades;
    grades
        .iter()
        .find(|band| total >= band.threshold)
        .or_else(|| grades.last())
}

pub fn get_grade(total: f64) -> (&'static str, &'static str) {
    grade_band(total)
        .map(|band| (band.grade.as_str(), band.color.as_str()))
        .unwrap_or(FALLBACK_GRADE)
}

/// Position of a letter grade in the table, 0 being the best grade.
pub fn grade_rank(grade: &str) -> Option<usize> {
    settings().grades.iter().position(|band| band.grade == grade)
}
