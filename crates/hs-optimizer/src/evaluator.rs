//! Evaluation of one (candidate, fold) unit of work.

use hs_types::{select, select_rows, Candidate, Estimator, Fold, ModelError, ModelResult, Scorer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of fitting and scoring one candidate on one fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub candidate_index: usize,
    pub fold_index: usize,
    pub candidate: Candidate,
    pub score: f64,
    /// Number of samples in the test split; the weight under iid averaging.
    pub test_size: usize,
    /// Seconds spent in `fit`.
    pub fit_duration: f64,
    /// Seconds spent scoring.
    pub score_duration: f64,
    /// Set when the error-score fallback replaced a failed evaluation.
    pub error: Option<String>,
}

impl FoldResult {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Scorer that defers to the model's own [`Estimator::score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatorScore;

impl<M: Estimator> Scorer<M> for EstimatorScore {
    fn score(&self, model: &M, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64> {
        model.score(x, y)
    }

    fn name(&self) -> &str {
        "estimator"
    }
}

/// Shared, read-only inputs for every unit of a run.
pub struct FoldEvaluator<'a, M> {
    estimator: &'a M,
    x: &'a Array2<f64>,
    y: Option<&'a Array1<f64>>,
    scorer: &'a dyn Scorer<M>,
}

impl<'a, M: Estimator> FoldEvaluator<'a, M> {
    pub fn new(
        estimator: &'a M,
        x: &'a Array2<f64>,
        y: Option<&'a Array1<f64>>,
        scorer: &'a dyn Scorer<M>,
    ) -> Self {
        Self {
            estimator,
            x,
            y,
            scorer,
        }
    }

    /// Clone the base model, apply `candidate`, fit on the training split and
    /// score on the test split. Failures are returned unchanged.
    pub fn evaluate(
        &self,
        candidate_index: usize,
        candidate: Candidate,
        fold_index: usize,
        fold: &Fold,
    ) -> ModelResult<FoldResult> {
        let (x_train, y_train) = self.subset(&fold.train)?;
        let (x_test, y_test) = self.subset(&fold.test)?;

        let mut model = self.estimator.clone();
        model.set_params(&candidate)?;

        let started = Instant::now();
        model.fit(&x_train, y_train.as_ref())?;
        let fit_duration = started.elapsed().as_secs_f64();

        let started = Instant::now();
        let score = self.scorer.score(&model, &x_test, y_test.as_ref())?;
        let score_duration = started.elapsed().as_secs_f64();

        Ok(FoldResult {
            candidate_index,
            fold_index,
            candidate,
            score,
            test_size: fold.test.len(),
            fit_duration,
            score_duration,
            error: None,
        })
    }

    /// Rows of `x` (and `y`) at `indices`, in that order.
    fn subset(&self, indices: &[usize]) -> ModelResult<(Array2<f64>, Option<Array1<f64>>)> {
        let x = select_rows(self.x, indices).map_err(|e| ModelError::fit(e.to_string()))?;
        let y = match self.y {
            Some(y) => Some(select(y, indices).map_err(|e| ModelError::fit(e.to_string()))?),
            None => None,
        };
        Ok((x, y))
    }
}
