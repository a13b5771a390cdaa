use rand::Rng;
use serde::{Deserialize, Serialize};

use super::insights::{generate_insights, Insight};
use super::profile::{avatar_color, avatar_initials, extract_profile, ProfileFields};
use super::section::{get_level, score_section, Level};
use super::tables::{get_grade, section_feedback};
use super::topsis::SectionScores;
use crate::settings::settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub section: String,
    pub score: f64,
    pub weight: f64,
    pub level: Level,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub filename: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
    pub role: String,
    pub avatar: String,
    pub avatar_color: String,
    pub sections: Vec<SectionResult>,
    pub total_score: f64,
    pub grade: String,
    pub grade_color: String,
    /// Filled in by the batch ranking pass.
    pub topsis_score: Option<f64>,
    pub rank: Option<usize>,
    pub insights: Vec<Insight>,
}

impl CandidateProfile {
    pub fn section(&self, name: &str) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.section == name)
    }

    pub fn section_scores(&self) -> SectionScores {
        self.sections
            .iter()
            .map(|s| (s.section.as_str(), s.score))
            .collect()
    }

    pub fn is_ranked(&self) -> bool {
        self.rank.is_some()
    }
}

/// One result per configured section, in configured order. Scores are kept at
/// one decimal place.
pub fn score_sections<R: Rng>(text: &str, rng: &mut R) -> Vec<SectionResult> {
    settings()
        .sections
        .iter()
        .map(|spec| {
            let score = round_to(score_section(text, &spec.name, rng), 1);
            let level = get_level(score);
            SectionResult {
                section: spec.name.clone(),
                score,
                weight: spec.weight,
                level,
                feedback: section_feedback(&spec.name, level).to_string(),
            }
        })
        .collect()
}

pub fn weighted_total(sections: &[SectionResult]) -> f64 {
    sections.iter().map(|s| s.score * s.weight / 100.0).sum()
}

/// Single-document pass: sections, total, grade, profile fields and insights.
/// `position` is the document's index in its batch and only picks the avatar
/// color.
pub fn score_document<R: Rng>(
    filename: &str,
    text: &str,
    position: usize,
    rng: &mut R,
) -> CandidateProfile {
    let sections = score_sections(text, rng);
    let total_score = round_to(weighted_total(&sections), 1);
    let (grade, grade_color) = get_grade(total_score);

    let profile = extract_profile(text, filename);
    let insights = generate_insights(&sections);

    CandidateProfile {
        filename: filename.to_string(),
        avatar: avatar_initials(&profile.name),
        avatar_color: avatar_color(position),
        role: settings().display.default_role.clone(),
        profile,
        sections,
        total_score,
        grade: grade.to_string(),
        grade_color: grade_color.to_string(),
        topsis_score: None,
        rank: None,
        insights,
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
