use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::settings;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    #[error(
        "candidate {candidate} does not match the criteria of the first candidate \
         (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    ShapeMismatch {
        candidate: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("candidate {candidate} has a non-finite score for {criterion}")]
    NonFinite { candidate: usize, criterion: String },
}

/// Insertion-ordered section name to score mapping, one per candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    entries: Vec<(String, f64)>,
}

impl SectionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a criterion, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, score: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((name, score)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, score)| *score)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for SectionScores {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut scores = SectionScores::new();
        for (name, score) in iter {
            scores.insert(name, score);
        }
        scores
    }
}

/// TOPSIS closeness coefficient for every candidate of a batch, in input order.
///
/// Criteria order comes from the first candidate; every other candidate must
/// carry exactly the same criteria names. All criteria are benefit criteria.
/// A batch of one, or of identical candidates, scores 0 across the board
/// since relative standing is undefined there.
pub fn rank_batch(batch: &[SectionScores]) -> Result<Vec<f64>, RankingError> {
    let Some(first) = batch.first() else {
        return Ok(Vec::new());
    };

    let criteria: Vec<&str> = first.names().collect();
    let matrix = decision_matrix(batch, &criteria)?;

    let s = settings();
    let weights: Vec<f64> = criteria
        .iter()
        .map(|name| s.section_weight(name) / 100.0)
        .collect();

    let m = criteria.len();
    let norms: Vec<f64> = (0..m)
        .map(|j| {
            let norm = matrix.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt();
            if norm == 0.0 {
                1.0
            } else {
                norm
            }
        })
        .collect();

    let weighted: Vec<Vec<f64>> = matrix
        .iter()
        .map(|row| {
            (0..m)
                .map(|j| row[j] / norms[j] * weights[j])
                .collect()
        })
        .collect();

    let best: Vec<f64> = (0..m)
        .map(|j| {
            weighted
                .iter()
                .map(|row| row[j])
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();
    let worst: Vec<f64> = (0..m)
        .map(|j| {
            weighted
                .iter()
                .map(|row| row[j])
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    let coefficients = weighted
        .iter()
        .map(|row| {
            let to_best = distance(row, &best);
            let to_worst = distance(row, &worst);
            let denominator = to_best + to_worst;
            let denominator = if denominator == 0.0 { 1.0 } else { denominator };
            to_worst / denominator
        })
        .collect();

    Ok(coefficients)
}

fn decision_matrix(
    batch: &[SectionScores],
    criteria: &[&str],
) -> Result<Vec<Vec<f64>>, RankingError> {
    batch
        .iter()
        .enumerate()
        .map(|(candidate, scores)| {
            let missing: Vec<String> = criteria
                .iter()
                .filter(|name| scores.get(name).is_none())
                .map(|name| name.to_string())
                .collect();
            let unexpected: Vec<String> = scores
                .names()
                .filter(|name| !criteria.contains(name))
                .map(str::to_string)
                .collect();

            if !missing.is_empty() || !unexpected.is_empty() {
                return Err(RankingError::ShapeMismatch {
                    candidate,
                    missing,
                    unexpected,
                });
            }

            criteria
                .iter()
                .filter_map(|name| scores.get(name).map(|score| (*name, score)))
                .map(|(name, score)| {
                    if score.is_finite() {
                        Ok(score)
                    } else {
                        Err(RankingError::NonFinite {
                            candidate,
                            criterion: name.to_string(),
                        })
                    }
                })
                .collect::<Result<Vec<f64>, RankingError>>()
        })
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Input indices ordered by descending coefficient. Ties keep input order.
pub fn assign_ranks(coefficients: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..coefficients.len()).collect();
    order.sort_by(|&a, &b| coefficients[b].total_cmp(&coefficients[a]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> SectionScores {
        pairs.iter().map(|(n, s)| (*n, *s)).collect()
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(rank_batch(&[]).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_single_candidate_is_zero() {
        let batch = vec![scores(&[("Skills", 90.0), ("Education", 40.0)])];
        assert_eq!(rank_batch(&batch).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_symmetric_pair_splits_evenly() {
        let batch = vec![
            scores(&[("Skills", 80.0), ("Education", 60.0)]),
            scores(&[("Skills", 60.0), ("Education", 80.0)]),
        ];
        let result = rank_batch(&batch).unwrap();
        assert!((result[0] - 0.5).abs() < 1e-12, "got {}", result[0]);
        assert!((result[1] - 0.5).abs() < 1e-12, "got {}", result[1]);
    }

    #[test]
    fn test_dominating_candidate_is_one() {
        let batch = vec![
            scores(&[("Skills", 50.0), ("Projects", 60.0)]),
            scores(&[("Skills", 90.0), ("Projects", 95.0)]),
            scores(&[("Skills", 70.0), ("Projects", 40.0)]),
        ];
        let result = rank_batch(&batch).unwrap();
        assert_eq!(result[1], 1.0);
        assert!(result.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_identical_candidates_are_zero() {
        let candidate = scores(&[("Skills", 70.0), ("Summary", 55.0)]);
        let batch = vec![candidate.clone(), candidate.clone(), candidate];
        assert_eq!(rank_batch(&batch).unwrap(), vec![0.0, 0.0, 0.0]);
        assert_eq!(assign_ranks(&[0.0, 0.0, 0.0]), vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_column_is_ignored() {
        let with_zero = vec![
            scores(&[("Skills", 80.0), ("Awards", 0.0)]),
            scores(&[("Skills", 60.0), ("Awards", 0.0)]),
        ];
        let without = vec![scores(&[("Skills", 80.0)]), scores(&[("Skills", 60.0)])];

        let a = rank_batch(&with_zero).unwrap();
        let b = rank_batch(&without).unwrap();
        assert!(a.iter().all(|c| c.is_finite()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_reordered_keys_are_accepted() {
        let a = vec![
            scores(&[("Skills", 80.0), ("Education", 60.0)]),
            scores(&[("Education", 80.0), ("Skills", 60.0)]),
        ];
        let result = rank_batch(&a).unwrap();
        assert!((result[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let batch = vec![
            scores(&[("Skills", 80.0), ("Education", 60.0)]),
            scores(&[("Skills", 60.0), ("Projects", 80.0)]),
        ];
        let err = rank_batch(&batch).unwrap_err();
        assert_eq!(
            err,
            RankingError::ShapeMismatch {
                candidate: 1,
                missing: vec!["Education".into()],
                unexpected: vec!["Projects".into()],
            }
        );
    }

    #[test]
    fn test_repeat_calls_are_bit_identical() {
        let batch = vec![
            scores(&[("Skills", 81.3), ("Education", 64.2), ("Formatting", 77.0)]),
            scores(&[("Skills", 59.9), ("Education", 88.8), ("Formatting", 52.5)]),
            scores(&[("Skills", 73.1), ("Education", 70.0), ("Formatting", 91.4)]),
        ];
        let first = rank_batch(&batch).unwrap();
        let second = rank_batch(&batch).unwrap();
        let bits = |v: &[f64]| v.iter().map(|c| c.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_assign_ranks_descending_stable() {
        assert_eq!(assign_ranks(&[0.2, 0.9, 0.2, 0.5]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_assign_ranks_tolerates_nan() {
        let coefficients: Vec<f64> = (0..40)
            .map(|i| if i % 3 == 0 { f64::NAN } else { i as f64 / 40.0 })
            .collect();
        let order = assign_ranks(&coefficients);

        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..40).collect::<Vec<_>>());

        let finite: Vec<f64> = order
            .iter()
            .map(|&i| coefficients[i])
            .filter(|c| c.is_finite())
            .collect();
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_non_finite_scores_are_rejected() {
        let batch = vec![
            scores(&[("Skills", 80.0), ("Education", 60.0)]),
            scores(&[("Skills", f64::NAN), ("Education", 80.0)]),
        ];
        assert_eq!(
            rank_batch(&batch).unwrap_err(),
            RankingError::NonFinite {
                candidate: 1,
                criterion: "Skills".into(),
            }
        );
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut s = SectionScores::new();
        s.insert("Skills", 10.0);
        s.insert("Skills", 20.0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("Skills"), Some(20.0));
    }
}
