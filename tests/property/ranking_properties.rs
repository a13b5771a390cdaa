use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ranksense::scoring::{
    assign_ranks, get_grade, get_level, grade_rank, rank_batch, score_section, Level,
    SectionScores,
};
use ranksense::settings::settings;

fn candidate(values: &[f64]) -> SectionScores {
    settings()
        .section_names()
        .zip(values.iter().copied())
        .collect()
}

fn batch_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    let sections = settings().sections.len();
    prop::collection::vec(prop::collection::vec(0.0f64..=100.0, sections), 1..10)
}

#[test]
fn section_weights_sum_to_one_hundred() {
    let total: f64 = settings().sections.iter().map(|s| s.weight).sum();
    assert!((total - 100.0).abs() < 1e-9, "total was {total}");
}

proptest! {
    #[test]
    fn coefficients_are_bounded(rows in batch_strategy()) {
        let batch: Vec<SectionScores> = rows.iter().map(|r| candidate(r)).collect();
        let coefficients = rank_batch(&batch).unwrap();
        prop_assert_eq!(coefficients.len(), batch.len());
        for c in coefficients {
            prop_assert!(c.is_finite());
            prop_assert!((0.0..=1.0).contains(&c), "coefficient {} out of range", c);
        }
    }

    #[test]
    fn ranking_is_deterministic(rows in batch_strategy()) {
        let batch: Vec<SectionScores> = rows.iter().map(|r| candidate(r)).collect();
        let first = rank_batch(&batch).unwrap();
        let second = rank_batch(&batch).unwrap();
        prop_assert_eq!(
            first.iter().map(|c| c.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|c| c.to_bits()).collect::<Vec<_>>()
        );
        prop_assert_eq!(assign_ranks(&first), assign_ranks(&second));
    }

    #[test]
    fn dominating_candidate_scores_one(rows in batch_strategy()) {
        let sections = settings().sections.len();
        let dominating: Vec<f64> = (0..sections)
            .map(|j| rows.iter().map(|r| r[j]).fold(0.0, f64::max) + 1.0)
            .collect();

        let mut batch: Vec<SectionScores> = rows.iter().map(|r| candidate(r)).collect();
        batch.push(candidate(&dominating));

        let coefficients = rank_batch(&batch).unwrap();
        prop_assert_eq!(coefficients[batch.len() - 1], 1.0);
        prop_assert_eq!(assign_ranks(&coefficients)[0], batch.len() - 1);
    }

    #[test]
    fn ranks_are_a_permutation(rows in batch_strategy()) {
        let batch: Vec<SectionScores> = rows.iter().map(|r| candidate(r)).collect();
        let coefficients = rank_batch(&batch).unwrap();
        let order = assign_ranks(&coefficients);

        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..batch.len()).collect::<Vec<_>>());
        for pair in order.windows(2) {
            prop_assert!(coefficients[pair[0]] >= coefficients[pair[1]]);
        }
    }

    #[test]
    fn level_banding_matches_thresholds(score in 0.0f64..=100.0) {
        let expected = if score >= 85.0 {
            Level::Excellent
        } else if score >= 70.0 {
            Level::Good
        } else if score >= 50.0 {
            Level::Moderate
        } else {
            Level::Poor
        };
        prop_assert_eq!(get_level(score), expected);
    }

    #[test]
    fn grades_never_improve_with_lower_totals(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_rank = grade_rank(get_grade(low).0).unwrap();
        let high_rank = grade_rank(get_grade(high).0).unwrap();
        prop_assert!(high_rank <= low_rank);
    }

    #[test]
    fn section_scores_stay_in_range(text in ".{0,400}", seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for section in settings().section_names() {
            let score = score_section(&text, section, &mut rng);
            prop_assert!((0.0..=100.0).contains(&score), "{} scored {}", section, score);
        }
    }
}
