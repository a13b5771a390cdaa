use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::extract::TextExtractor;
use crate::scoring::{
    assign_ranks, rank_batch, round_to, score_document, CandidateProfile, RankingError,
};
use crate::settings::settings;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no documents provided")]
    Empty,
    #[error("at most {max} documents per batch, got {got}")]
    TooManyDocuments { max: usize, got: usize },
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error("scoring task failed: {0}")]
    Task(#[from] JoinError),
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a document from disk, keeping only the file name.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub job: JobContext,
    pub created_at: DateTime<Utc>,
    /// Sorted by rank, best first.
    pub candidates: Vec<CandidateProfile>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn top(&self) -> Option<&CandidateProfile> {
        self.candidates.first()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Seeds the scoring jitter. Each document gets `seed + position`.
    pub seed: Option<u64>,
}

impl BatchOptions {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng_for(&self, position: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(position as u64)),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Extracts, scores and ranks a batch of documents.
///
/// Documents are scored in parallel on the blocking pool and collected back
/// into submission order before the ranking pass runs over the whole batch.
pub async fn evaluate_batch(
    job: JobContext,
    documents: Vec<SourceDocument>,
    extractor: Arc<dyn TextExtractor>,
    options: BatchOptions,
) -> Result<Batch, BatchError> {
    let max = settings().batch.max_documents;
    if documents.is_empty() {
        return Err(BatchError::Empty);
    }
    if documents.len() > max {
        return Err(BatchError::TooManyDocuments {
            max,
            got: documents.len(),
        });
    }

    let count = documents.len();
    let mut tasks = JoinSet::new();

    for (position, document) in documents.into_iter().enumerate() {
        let extractor = Arc::clone(&extractor);
        let mut rng = options.rng_for(position);

        tasks.spawn_blocking(move || {
            let text = extract_or_empty(extractor.as_ref(), &document);
            if text.is_empty() {
                warn!(filename = %document.filename, "no text extracted");
            }
            let candidate = score_document(&document.filename, &text, position, &mut rng);
            debug!(
                filename = %candidate.filename,
                total = candidate.total_score,
                grade = %candidate.grade,
                "scored document"
            );
            (position, candidate)
        });
    }

    let mut slots: Vec<Option<CandidateProfile>> = vec![None; count];
    while let Some(joined) = tasks.join_next().await {
        let (position, candidate) = joined?;
        slots[position] = Some(candidate);
    }

    let candidates = rank_candidates(slots.into_iter().flatten().collect())?;
    info!(candidates = candidates.len(), "batch ranked");

    Ok(Batch {
        job,
        created_at: Utc::now(),
        candidates,
    })
}

/// Runs the extractor, treating a panic like any other extraction failure:
/// the document is scored from empty text.
fn extract_or_empty(extractor: &dyn TextExtractor, document: &SourceDocument) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| {
        extractor.extract(&document.filename, &document.bytes)
    }))
    .unwrap_or_else(|_| {
        warn!(filename = %document.filename, "extractor panicked");
        String::new()
    })
}

/// Second pass over an individually scored batch: fills in the TOPSIS
/// coefficient (four decimals) and the 1-based rank, and returns the
/// candidates best first. Equal coefficients keep submission order.
pub fn rank_candidates(
    candidates: Vec<CandidateProfile>,
) -> Result<Vec<CandidateProfile>, RankingError> {
    let matrix: Vec<_> = candidates.iter().map(|c| c.section_scores()).collect();
    let coefficients: Vec<f64> = rank_batch(&matrix)?
        .into_iter()
        .map(|c| round_to(c, 4))
        .collect();
    let order = assign_ranks(&coefficients);

    let mut slots: Vec<Option<CandidateProfile>> = candidates.into_iter().map(Some).collect();
    let ranked = order
        .into_iter()
        .enumerate()
        .filter_map(|(position, index)| {
            slots[index].take().map(|mut candidate| {
                candidate.topsis_score = Some(coefficients[index]);
                candidate.rank = Some(position + 1);
                candidate
            })
        })
        .collect();

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PlainTextExtractor;

    const STRONG: &str = "\
Meera Iyer
meera@example.com | +91 90000 11111 | github.com/meera | linkedin.com/in/meera
Summary: profile of a platform engineer, objective is reliability.
Education: M.Tech, Anna University, GPA 9.0, bachelor degree in CS.
Experience: 7 years of work as engineer and developer at a company, internship at a bank.
Skills: Rust, Go, Kubernetes, tools, frameworks, languages, expertise in tracing.
Projects: built a scheduler, developed a cache, implemented a query engine.
Achievements: awards, publications, certifications.";

    fn extractor() -> Arc<dyn TextExtractor> {
        Arc::new(PlainTextExtractor)
    }

    fn documents() -> Vec<SourceDocument> {
        vec![
            SourceDocument::new("blank.pdf", b"%PDF-1.7".to_vec()),
            SourceDocument::new("meera.txt", STRONG.as_bytes().to_vec()),
            SourceDocument::new("short.txt", b"hi".to_vec()),
        ]
    }

    #[tokio::test]
    async fn test_batch_is_ranked_best_first() {
        let batch = evaluate_batch(
            JobContext::default(),
            documents(),
            extractor(),
            BatchOptions::seeded(3),
        )
        .await
        .unwrap();

        assert_eq!(batch.len(), 3);
        let ranks: Vec<usize> = batch.candidates.iter().filter_map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        let scores: Vec<f64> = batch
            .candidates
            .iter()
            .filter_map(|c| c.topsis_score)
            .collect();
        assert_eq!(scores.len(), 3);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn test_seeded_batches_repeat() {
        let run = || {
            evaluate_batch(
                JobContext::default(),
                documents(),
                extractor(),
                BatchOptions::seeded(99),
            )
        };
        let a = run().await.unwrap();
        let b = run().await.unwrap();

        let summary = |batch: &Batch| {
            batch
                .candidates
                .iter()
                .map(|c| (c.filename.clone(), c.total_score, c.topsis_score))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&a), summary(&b));
    }

    #[tokio::test]
    async fn test_avatar_colors_follow_submission_order() {
        let batch = evaluate_batch(
            JobContext::default(),
            documents(),
            extractor(),
            BatchOptions::seeded(5),
        )
        .await
        .unwrap();

        let meera = batch
            .candidates
            .iter()
            .find(|c| c.filename == "meera.txt")
            .unwrap();
        assert_eq!(meera.avatar_color, "#8b5cf6");
        assert_eq!(meera.profile.name, "Meera Iyer");
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let result = evaluate_batch(
            JobContext::default(),
            Vec::new(),
            extractor(),
            BatchOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(BatchError::Empty)));
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected() {
        let documents = (0..26)
            .map(|i| SourceDocument::new(format!("{i}.txt"), b"text".to_vec()))
            .collect();
        let result = evaluate_batch(
            JobContext::default(),
            documents,
            extractor(),
            BatchOptions::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(BatchError::TooManyDocuments { max: 25, got: 26 })
        ));
    }

    struct Flaky;

    impl TextExtractor for Flaky {
        fn extract(&self, filename: &str, bytes: &[u8]) -> String {
            if filename == "bad.txt" {
                panic!("decoder blew up");
            }
            PlainTextExtractor.extract(filename, bytes)
        }
    }

    #[tokio::test]
    async fn test_panicking_extractor_degrades_to_placeholder() {
        let documents = vec![
            SourceDocument::new("bad.txt", b"anything".to_vec()),
            SourceDocument::new("meera.txt", STRONG.as_bytes().to_vec()),
        ];
        let batch = evaluate_batch(
            JobContext::default(),
            documents,
            Arc::new(Flaky),
            BatchOptions::seeded(11),
        )
        .await
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert!(batch.candidates.iter().all(|c| c.is_ranked()));

        let bad = batch
            .candidates
            .iter()
            .find(|c| c.filename == "bad.txt")
            .unwrap();
        assert!(bad.sections.iter().all(|s| (40.0..=60.0).contains(&s.score)));
        assert_eq!(bad.profile.name, "Bad");
    }

    #[test]
    fn test_identical_candidates_keep_submission_order() {
        let mut rng = StdRng::seed_from_u64(8);
        let base = score_document("a.txt", STRONG, 0, &mut rng);
        let candidates: Vec<CandidateProfile> = ["a.txt", "b.txt", "c.txt"]
            .iter()
            .map(|name| CandidateProfile {
                filename: name.to_string(),
                ..base.clone()
            })
            .collect();

        let ranked = rank_candidates(candidates).unwrap();
        let names: Vec<&str> = ranked.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        assert!(ranked.iter().all(|c| c.topsis_score == Some(0.0)));
    }

    #[test]
    fn test_single_candidate_ranks_first_with_zero() {
        let mut rng = StdRng::seed_from_u64(9);
        let only = score_document("solo.txt", STRONG, 0, &mut rng);
        let ranked = rank_candidates(vec![only]).unwrap();
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[0].topsis_score, Some(0.0));
    }
}
