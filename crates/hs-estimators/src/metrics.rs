//! Regression and classification metrics, and a scorer built on them.

use hs_types::{Estimator, ModelError, ModelResult, Scorer};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ModelResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(ModelError::Score {
            message: format!(
                "{} targets but {} predictions",
                y_true.len(),
                y_pred.len()
            ),
        });
    }
    if y_true.is_empty() {
        return Err(ModelError::Score {
            message: "cannot score an empty sample".into(),
        });
    }
    Ok(())
}

/// Fraction of predictions equal to the target after rounding to class labels.
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ModelResult<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.round() == p.round())
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Coefficient of determination. A constant target scores 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ModelResult<f64> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res = (y_true - y_pred).mapv(|d| d * d).sum();
    let ss_tot = y_true.mapv(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ModelResult<f64> {
    check_lengths(y_true, y_pred)?;
    Ok((y_true - y_pred).mapv(|d| d * d).sum() / y_true.len() as f64)
}

pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ModelResult<f64> {
    check_lengths(y_true, y_pred)?;
    Ok((y_true - y_pred).mapv(f64::abs).sum() / y_true.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    R2,
    MeanSquaredError,
    MeanAbsoluteError,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::R2 => "r2",
            Self::MeanSquaredError => "neg_mean_squared_error",
            Self::MeanAbsoluteError => "neg_mean_absolute_error",
        }
    }

    pub fn greater_is_better(&self) -> bool {
        matches!(self, Self::Accuracy | Self::R2)
    }

    pub fn compute(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ModelResult<f64> {
        match self {
            Self::Accuracy => accuracy_score(y_true, y_pred),
            Self::R2 => r2_score(y_true, y_pred),
            Self::MeanSquaredError => mean_squared_error(y_true, y_pred),
            Self::MeanAbsoluteError => mean_absolute_error(y_true, y_pred),
        }
    }
}

/// Scores a model by predicting `x` and comparing against `y`.
///
/// Error metrics are negated so that a greater score is always better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricScorer {
    pub metric: Metric,
}

impl MetricScorer {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl<M: Estimator> Scorer<M> for MetricScorer {
    fn score(&self, model: &M, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64> {
        let y = y.ok_or_else(|| ModelError::Score {
            message: format!("{} needs targets", self.metric.name()),
        })?;
        let predictions = model.predict(x)?;
        let value = self.metric.compute(y, &predictions)?;
        Ok(if self.metric.greater_is_better() {
            value
        } else {
            -value
        })
    }

    fn name(&self) -> &str {
        self.metric.name()
    }
}
