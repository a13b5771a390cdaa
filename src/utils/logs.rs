use console::{measure_text_width, Style};

use crate::batch::{Batch, JobContext};
use crate::scoring::{CandidateProfile, Evidence, InsightKind, Level};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const NAME_COLUMN: usize = 24;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_item(index: usize, count: usize) -> String {
    if index + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn batch_prefix() -> String {
    blue().apply_to("[BATCH]").to_string()
}

fn rank_prefix() -> String {
    magenta().apply_to("[RANK]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Excellent => green(),
        Level::Good => cyan(),
        Level::Moderate => yellow(),
        Level::Poor => red(),
    }
}

fn grade_style(grade: &str) -> Style {
    match grade.chars().next() {
        Some('A') => green().bold(),
        Some('B') => cyan().bold(),
        _ => yellow().bold(),
    }
}

pub fn log_newline() {
    println!();
}

pub fn log_header(title: &str) {
    println!("{}", bold().apply_to(title.to_uppercase()));
}

pub fn log_batch_start(count: usize, job: &JobContext) {
    let title = job.title.as_deref().unwrap_or("untitled role");
    println!(
        "{} evaluating {} documents for {}...",
        batch_prefix(),
        bold().apply_to(count),
        cyan().apply_to(title),
    );
    if let Some(description) = job.description.as_deref() {
        println!("{}{}", tree_end(), dim().apply_to(truncate(description, 60)));
    }
}

pub fn log_document_loaded(filename: &str, bytes: usize) {
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label(filename, 1),
        dim().apply_to(format!("{bytes} bytes"))
    );
}

pub fn log_document_failed(path: &str, error: &str) {
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label(path, 1),
        red().apply_to(error)
    );
}

pub fn log_document_empty(filename: &str) {
    println!("{}", document_empty_line(filename));
}

fn document_empty_line(filename: &str) -> String {
    format!(
        "{} no text in {}, sections get placeholder scores",
        yellow().apply_to("empty"),
        dim().apply_to(filename)
    )
}

/// Ranked table, best first.
pub fn log_ranking(batch: &Batch) {
    println!(
        "{} {} candidates ranked at {}",
        rank_prefix(),
        bold().apply_to(batch.len()),
        dim().apply_to(batch.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
    );

    let count = batch.len();
    for (i, candidate) in batch.candidates.iter().enumerate() {
        let rank = candidate
            .rank
            .map(|r| format!("#{r:<3}"))
            .unwrap_or_else(|| "#-  ".into());
        let topsis = candidate
            .topsis_score
            .map(|t| format!("{t:.4}"))
            .unwrap_or_else(|| "-".into());
        let name = truncate(&candidate.profile.name, NAME_COLUMN);
        let name_pad = " ".repeat(NAME_COLUMN.saturating_sub(measure_text_width(&name)));

        println!(
            "{}{} {}{} {} {:>5.1} {} {}",
            tree_item(i, count),
            bold().apply_to(rank),
            name,
            name_pad,
            grade_style(&candidate.grade).apply_to(format!("{:<2}", candidate.grade)),
            candidate.total_score,
            cyan().apply_to(topsis),
            dim().apply_to(&candidate.filename),
        );
    }
}

/// Explains one scored document: profile facts, per-section evidence and
/// score, grade and insights.
#[derive(Debug, Clone)]
pub struct CandidateAssessment {
    pub candidate: CandidateProfile,
    pub evidence: Vec<(String, Evidence)>,
}

impl CandidateAssessment {
    pub fn new(candidate: CandidateProfile, evidence: Vec<(String, Evidence)>) -> Self {
        Self {
            candidate,
            evidence,
        }
    }

    fn evidence_for(&self, section: &str) -> Option<&Evidence> {
        self.evidence
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, evidence)| evidence)
    }

    pub fn print(&self) {
        let c = &self.candidate;
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!(
            "{} \"{}\"",
            magenta().apply_to(bold().apply_to("[CANDIDATE ASSESSMENT]")),
            dim().apply_to(&c.filename)
        ));

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("PROFILE")));
        let keywords = if c.profile.keywords.is_empty() {
            "none".to_string()
        } else {
            c.profile.keywords.join(", ")
        };
        let facts = [
            ("name", c.profile.name.as_str()),
            ("email", c.profile.email.as_str()),
            ("phone", c.profile.phone.as_str()),
            ("education", c.profile.education.as_str()),
            ("experience", c.profile.experience.as_str()),
            ("location", c.profile.location.as_str()),
            ("keywords", keywords.as_str()),
        ];
        for (i, (label, value)) in facts.iter().enumerate() {
            let value = if value.is_empty() {
                dim().apply_to("-").to_string()
            } else {
                value.to_string()
            };
            lines.push(format!(
                "{}{} {}",
                tree_item(i, facts.len()),
                pad_label(label, 1),
                value
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("SECTIONS")));
        let count = c.sections.len();
        for (i, section) in c.sections.iter().enumerate() {
            let last = i + 1 == count;
            lines.push(format!(
                "{}{} {:>5.1} {}",
                tree_item(i, count),
                pad_label(&section.section, 1),
                section.score,
                level_style(section.level).apply_to(section.level)
            ));

            let indent = if last {
                "    ".to_string()
            } else {
                tree_indent()
            };
            lines.push(format!(
                "{}{}{} {}",
                indent,
                tree_branch(),
                pad_label("evidence", 2),
                dim().apply_to(format_evidence(self.evidence_for(&section.section)))
            ));
            lines.push(format!(
                "{}{}{} {}",
                indent,
                tree_end(),
                pad_label("feedback", 2),
                dim().apply_to(&section.feedback)
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("INSIGHTS")));
        let count = c.insights.len();
        if count == 0 {
            lines.push(format!("{}{}", tree_end(), dim().apply_to("none")));
        }
        for (i, insight) in c.insights.iter().enumerate() {
            let style = match insight.kind {
                InsightKind::Success => green(),
                InsightKind::Warning => yellow(),
                InsightKind::Error => red(),
            };
            lines.push(format!(
                "{}{} {}",
                tree_item(i, count),
                style.apply_to(format!("{:<8}", insight.kind)),
                insight.text
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("RESULT")));
        lines.push(format!(
            "{}{} {:.1}",
            tree_branch(),
            pad_label("total", 1),
            c.total_score
        ));
        lines.push(format!(
            "{}{} {} {}",
            tree_end(),
            pad_label("grade", 1),
            grade_style(&c.grade).apply_to(&c.grade),
            dim().apply_to(&c.grade_color)
        ));

        println!("{}\n", lines.join("\n"));
    }
}

fn format_evidence(evidence: Option<&Evidence>) -> String {
    match evidence {
        Some(Evidence::Insufficient { chars }) => format!("placeholder ({chars} chars)"),
        Some(Evidence::Signature { matches, words }) => {
            format!("{matches} keyword hits in {words} words")
        }
        Some(Evidence::Layout { avg_line_length }) => {
            format!("layout (avg line {avg_line_length:.1} chars)")
        }
        None => "unknown".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_label_aligns_values() {
        assert_eq!(measure_text_width(&pad_label("name", 1)), VALUE_COLUMN - 4);
        assert_eq!(measure_text_width(&pad_label("evidence", 2)), VALUE_COLUMN - 8);
        assert_eq!(pad_label(&"x".repeat(30), 1), format!("{} ", "x".repeat(30)));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long candidate name", 10), "a rathe...");
    }

    #[test]
    fn test_empty_document_line_is_not_a_skip() {
        let line = console::strip_ansi_codes(&document_empty_line("scan.pdf")).to_string();
        assert_eq!(
            line,
            "empty no text in scan.pdf, sections get placeholder scores"
        );
    }

    #[test]
    fn test_format_evidence() {
        let evidence = Evidence::Signature {
            matches: 4,
            words: 120,
        };
        assert_eq!(format_evidence(Some(&evidence)), "4 keyword hits in 120 words");
        assert_eq!(
            format_evidence(Some(&Evidence::Insufficient { chars: 12 })),
            "placeholder (12 chars)"
        );
        assert_eq!(format_evidence(None), "unknown");
    }
}
