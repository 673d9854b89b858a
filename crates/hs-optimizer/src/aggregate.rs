//! Per-candidate aggregation of fold results and best-candidate selection.

use hs_types::{consistency_error, Candidate, SearchResult};
use serde::{Deserialize, Serialize};

use crate::evaluator::FoldResult;

/// Cross-validated score of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub candidate: Candidate,
    pub mean_score: f64,
    /// Population standard deviation of `fold_scores`.
    pub std_score: f64,
    /// One score per fold, in fold order.
    pub fold_scores: Vec<f64>,
    /// Folds whose score came from the error-score fallback.
    pub n_failed: usize,
}

/// Fold results are expected candidate-major, fold-minor: each consecutive
/// block of `n_folds` belongs to one candidate. A block that mixes
/// candidates means the results were reassembled wrongly.
pub fn aggregate(
    results: &[FoldResult],
    n_folds: usize,
    iid: bool,
) -> SearchResult<Vec<CandidateScore>> {
    if n_folds == 0 {
        return Err(consistency_error!("cannot aggregate over zero folds"));
    }
    if results.len() % n_folds != 0 {
        return Err(consistency_error!(
            "{} fold results do not split into blocks of {} folds",
            results.len(),
            n_folds
        ));
    }

    results
        .chunks(n_folds)
        .enumerate()
        .map(|(block, chunk)| score_block(block, chunk, iid))
        .collect()
}

fn score_block(block: usize, chunk: &[FoldResult], iid: bool) -> SearchResult<CandidateScore> {
    let first = &chunk[0];
    if let Some(other) = chunk.iter().find(|r| r.candidate != first.candidate) {
        return Err(consistency_error!(
            "block {block} mixes candidates {} and {}",
            first.candidate,
            other.candidate
        ));
    }

    let fold_scores: Vec<f64> = chunk.iter().map(|r| r.score).collect();
    let k = fold_scores.len() as f64;
    let plain_mean = fold_scores.iter().sum::<f64>() / k;

    let mean_score = if iid {
        let total: usize = chunk.iter().map(|r| r.test_size).sum();
        let weighted: f64 = chunk.iter().map(|r| r.score * r.test_size as f64).sum();
        weighted / total as f64
    } else {
        plain_mean
    };

    let variance = fold_scores
        .iter()
        .map(|s| (s - plain_mean).powi(2))
        .sum::<f64>()
        / k;

    Ok(CandidateScore {
        candidate: first.candidate.clone(),
        mean_score,
        std_score: variance.sqrt(),
        fold_scores,
        n_failed: chunk.iter().filter(|r| r.failed()).count(),
    })
}

/// Index of the highest `mean_score`; ties go to the earliest candidate and
/// a NaN mean never beats a number.
pub fn select_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, score) in scores.iter().enumerate() {
        let better = match best {
            None => true,
            Some(b) => {
                let current = scores[b].mean_score;
                score.mean_score > current || (current.is_nan() && !score.mean_score.is_nan())
            }
        };
        if better {
            best = Some(i);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(candidate: &Candidate, fold: usize, score: f64, test_size: usize) -> FoldResult {
        FoldResult {
            candidate_index: 0,
            fold_index: fold,
            candidate: candidate.clone(),
            score,
            test_size,
            fit_duration: 0.0,
            score_duration: 0.0,
            error: None,
        }
    }

    fn score(mean: f64) -> CandidateScore {
        CandidateScore {
            candidate: Candidate::new().with("mean", mean),
            mean_score: mean,
            std_score: 0.0,
            fold_scores: vec![mean],
            n_failed: 0,
        }
    }

    #[test]
    fn iid_weights_by_test_size() {
        let c = Candidate::new().with("a", 1);
        let results = vec![result(&c, 0, 1.0, 10), result(&c, 1, 0.0, 30)];
        let scores = aggregate(&results, 2, true).unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[0].mean_score - 0.25).abs() < 1e-12);
        assert_eq!(scores[0].fold_scores, vec![1.0, 0.0]);
        assert!((scores[0].std_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_iid_is_plain_mean() {
        let c = Candidate::new().with("a", 1);
        let results = vec![result(&c, 0, 1.0, 10), result(&c, 1, 0.0, 30)];
        let scores = aggregate(&results, 2, false).unwrap();
        assert!((scores[0].mean_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn blocks_follow_candidate_order() {
        let a = Candidate::new().with("k", 1);
        let b = Candidate::new().with("k", 2);
        let results = vec![
            result(&a, 0, 0.1, 5),
            result(&a, 1, 0.3, 5),
            result(&b, 0, 0.9, 5),
            result(&b, 1, 0.7, 5),
        ];
        let scores = aggregate(&results, 2, true).unwrap();
        assert_eq!(scores[0].candidate, a);
        assert_eq!(scores[1].candidate, b);
        assert!((scores[1].mean_score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn mixed_block_is_an_internal_error() {
        let a = Candidate::new().with("k", 1);
        let b = Candidate::new().with("k", 2);
        let results = vec![result(&a, 0, 0.1, 5), result(&b, 1, 0.3, 5)];
        let err = aggregate(&results, 2, true).unwrap_err();
        assert!(matches!(err, hs_types::SearchError::InternalConsistency(_)));
        assert!(aggregate(&results, 3, true).is_err());
        assert!(aggregate(&results, 0, true).is_err());
    }

    #[test]
    fn failed_folds_are_counted() {
        let c = Candidate::new();
        let mut failed = result(&c, 1, 0.0, 5);
        failed.error = Some("fit failed".into());
        let scores = aggregate(&[result(&c, 0, 1.0, 5), failed], 2, false).unwrap();
        assert_eq!(scores[0].n_failed, 1);
    }

    #[test]
    fn ties_go_to_the_earliest_candidate() {
        let scores = vec![score(0.2), score(0.9), score(0.5), score(0.9)];
        assert_eq!(select_best(&scores), Some(1));
    }

    #[test]
    fn nan_never_wins() {
        let scores = vec![score(f64::NAN), score(-3.0), score(f64::NAN)];
        assert_eq!(select_best(&scores), Some(1));
        assert_eq!(select_best(&[score(f64::NAN)]), Some(0));
        assert_eq!(select_best(&[]), None);
    }
}
