use serde::{Deserialize, Serialize};
use strum::Display;

use super::{Level, SectionResult};

pub const MAX_INSIGHTS: usize = 3;
pub const ERROR_BELOW: f64 = 65.0;
pub const WARNING_BELOW: f64 = 78.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InsightKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub text: String,
}

impl Insight {
    fn new(kind: InsightKind, text: String) -> Self {
        Self { kind, text }
    }
}

/// Derives up to three observations from a candidate's own section scores:
/// the strongest section, the weakest one if it is weak enough, and the
/// median section.
pub fn generate_insights(sections: &[SectionResult]) -> Vec<Insight> {
    if sections.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(&str, f64, Level)> = sections
        .iter()
        .map(|result| (result.section.as_str(), result.score, result.level))
        .collect();
    // stable: equal scores keep insertion order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (top_name, _, top_level) = ranked[0];
    let (bottom_name, bottom_score, _) = ranked[ranked.len() - 1];
    let (mid_name, _, mid_level) = ranked[ranked.len() / 2];

    let mut insights = vec![Insight::new(
        InsightKind::Success,
        format!("Strong {top_name} section, {top_level} level"),
    )];

    if bottom_score < ERROR_BELOW {
        insights.push(Insight::new(
            InsightKind::Error,
            format!("{bottom_name} needs significant improvement"),
        ));
    } else if bottom_score < WARNING_BELOW {
        insights.push(Insight::new(
            InsightKind::Warning,
            format!("{bottom_name} could be stronger with more detail"),
        ));
    }

    if mid_level.needs_work() {
        insights.push(Insight::new(
            InsightKind::Warning,
            format!("Consider enhancing {mid_name} for better ranking"),
        ));
    } else {
        insights.push(Insight::new(
            InsightKind::Success,
            "Well-rounded profile across most sections".to_string(),
        ));
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}
