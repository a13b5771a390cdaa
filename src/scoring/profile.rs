use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

use crate::settings::settings;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap());
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s-]{8,13}\d").unwrap());
static YEARS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+[.\d]*)\s*(years?|yrs?)").unwrap());
static EMPLOYMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(internship|full.?time|employed|worked at|joining)").unwrap()
});

static INSTITUTION_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let alternatives = &settings().profile.institution_patterns;
    if alternatives.is_empty() {
        return None;
    }
    let pattern = format!("({})", alternatives.join("|"));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(error = %e, "institution patterns do not compile");
            None
        }
    }
});

const NAME_FORBIDDEN: &[char] = &['@', '.', ':', '/'];
const UNKNOWN_LOCATION: &str = "Unknown";
const UNKNOWN_INSTITUTION: &str = "University";
const UNKNOWN_INITIALS: &str = "??";

/// Display facts pulled from a resume. Every field has a placeholder, so
/// extraction never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub education: String,
    pub experience: String,
    pub location: String,
    pub keywords: Vec<String>,
}

pub fn extract_profile(text: &str, filename: &str) -> ProfileFields {
    ProfileFields {
        name: extract_name(text, filename),
        email: extract_email(text),
        phone: extract_phone(text),
        education: extract_education(text),
        experience: extract_experience(text),
        location: extract_location(text),
        keywords: extract_keywords(text),
    }
}

/// First short line near the top that does not look like contact details,
/// otherwise the filename stem.
pub fn extract_name(text: &str, filename: &str) -> String {
    let scan = settings().profile.name_scan_lines;

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(scan)
        .find(|line| {
            let words = line.split_whitespace().count();
            (2..=4).contains(&words) && !line.contains(NAME_FORBIDDEN)
        })
        .map(title_case)
        .unwrap_or_else(|| {
            let stem = filename
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(filename);
            title_case(&stem.replace(&['_', '-'][..], " "))
        })
}

pub fn extract_email(text: &str) -> String {
    EMAIL_PATTERN
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn extract_phone(text: &str) -> String {
    PHONE_PATTERN
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn extract_location(text: &str) -> String {
    let text_lower = text.to_lowercase();
    settings()
        .profile
        .cities
        .iter()
        .find(|city| text_lower.contains(&city.to_lowercase()))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}

pub fn extract_education(text: &str) -> String {
    INSTITUTION_PATTERN
        .as_ref()
        .and_then(|pattern| pattern.find(text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_INSTITUTION.to_string())
}

pub fn extract_experience(text: &str) -> String {
    if let Some(caps) = YEARS_PATTERN.captures(text) {
        let amount = &caps[1];
        let plural = amount.parse::<f64>().map(|v| v > 1.0).unwrap_or(false);
        return format!("{amount} yr{}", if plural { "s" } else { "" });
    }

    match EMPLOYMENT_PATTERN.find_iter(text).count() {
        n if n >= 3 => "3+ yrs".to_string(),
        2 => "2 yrs".to_string(),
        _ => "< 1 yr".to_string(),
    }
}

pub fn extract_keywords(text: &str) -> Vec<String> {
    let p = &settings().profile;
    let text_lower = text.to_lowercase();

    let mut found: Vec<String> = Vec::new();
    for keyword in &p.tech_keywords {
        if found.len() >= p.max_keywords {
            break;
        }
        if text_lower.contains(&keyword.to_lowercase()) && !found.contains(keyword) {
            found.push(keyword.clone());
        }
    }
    found
}

pub fn avatar_initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        UNKNOWN_INITIALS.to_string()
    } else {
        initials
    }
}

pub fn avatar_color(index: usize) -> String {
    let palette = &settings().display.avatar_colors;
    if palette.is_empty() {
        return String::new();
    }
    palette[index % palette.len()].clone()
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_cased = c.is_alphabetic();
    }
    out
}
