use rand::Rng;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

use crate::settings::{settings, LayoutScoring, SignatureScoring};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl Level {
    pub fn needs_work(&self) -> bool {
        matches!(self, Level::Moderate | Level::Poor)
    }
}

static SIGNATURES: LazyLock<HashMap<String, Regex>> = LazyLock::new(|| {
    settings()
        .sections
        .iter()
        .filter_map(|spec| {
            let pattern = spec.signature.as_ref()?;
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(regex) => Some((spec.name.clone(), regex)),
                Err(e) => {
                    warn!(section = %spec.name, error = %e, "signature does not compile");
                    None
                }
            }
        })
        .collect()
});

/// What the scorer saw in the text for one section, before jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evidence {
    Insufficient { chars: usize },
    Signature { matches: usize, words: usize },
    Layout { avg_line_length: f64 },
}

pub fn section_evidence(text: &str, section: &str) -> Evidence {
    let chars = text.chars().count();
    if chars < settings().scoring.min_text_length {
        return Evidence::Insufficient { chars };
    }

    match SIGNATURES.get(section) {
        Some(signature) => Evidence::Signature {
            matches: signature.find_iter(text).count(),
            words: text.split_whitespace().count(),
        },
        None => Evidence::Layout {
            avg_line_length: average_line_length(text),
        },
    }
}

/// Scores one section of `text` on a 0-100 scale.
///
/// Text shorter than the minimum length gets a mid-range placeholder: missing
/// text is not evidence of a missing section. Sections without a signature
/// pattern fall back to the line-length layout heuristic.
pub fn score_section<R: Rng>(text: &str, section: &str, rng: &mut R) -> f64 {
    let s = &settings().scoring;

    match section_evidence(text, section) {
        Evidence::Insufficient { .. } => rng.random_range(s.placeholder.min..=s.placeholder.max),
        Evidence::Signature { matches, words } => {
            signature_score(matches, words, &s.signature, rng)
        }
        Evidence::Layout { avg_line_length } => layout_score(avg_line_length, &s.layout, rng),
    }
}

fn signature_score<R: Rng>(
    matches: usize,
    words: usize,
    c: &SignatureScoring,
    rng: &mut R,
) -> f64 {
    let word_count = words as f64;
    let density = matches as f64 / (word_count / c.words_per_density_unit).max(1.0);

    let base = c.base
        + (density * c.density_scale).min(c.density_cap)
        + (word_count / c.words_per_richness_point).min(c.richness_cap);
    let jitter = rng.random_range(-c.jitter..=c.jitter);

    (base + jitter).clamp(c.clamp.min, c.clamp.max)
}

fn layout_score<R: Rng>(avg_line_length: f64, c: &LayoutScoring, rng: &mut R) -> f64 {
    let bonus = if avg_line_length > c.readable_min_line && avg_line_length < c.readable_max_line
    {
        c.readable_bonus
    } else {
        0.0
    };
    let jitter = rng.random_range(-c.jitter..=c.jitter);

    (c.base + bonus + jitter).clamp(c.clamp.min, c.clamp.max)
}

fn average_line_length(text: &str) -> f64 {
    let (lines, chars) = text
        .split('\n')
        .fold((0usize, 0usize), |(lines, chars), line| {
            (lines + 1, chars + line.chars().count())
        });
    chars as f64 / lines.max(1) as f64
}

/// Ordered interval lookup over the configured level bands, first match wins.
pub fn get_level(score: f64) -> Level {
    settings()
        .levels
        .iter()
        .find(|band| band.min <= score && score < band.max)
        .map(|band| band.level)
        .unwrap_or(Level::Poor)
}
