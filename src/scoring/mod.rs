pub mod insights;
pub mod profile;
mod score;
mod section;
mod tables;
pub mod topsis;

pub use insights::{generate_insights, Insight, InsightKind};
pub use profile::{extract_profile, ProfileFields};
pub use score::{
    score_document, score_sections, weighted_total, CandidateProfile, SectionResult,
};
pub use section::{get_level, score_section, section_evidence, Evidence, Level};
pub use tables::{get_grade, grade_band, grade_rank, section_feedback};
pub use topsis::{assign_ranks, rank_batch, RankingError, SectionScores};

pub(crate) use score::round_to;
