//! Brute-force k-nearest-neighbours models.

use hs_types::{Candidate, Estimator, ModelError, ModelResult, ParameterValue};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::metrics::{accuracy_score, r2_score};

const DISTANCE_EPSILON: f64 = 1e-10;

/// How neighbours contribute to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weights {
    #[default]
    Uniform,
    /// Inverse distance.
    Distance,
}

impl Weights {
    fn of(&self, distance: f64) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::Distance => 1.0 / (distance + DISTANCE_EPSILON),
        }
    }
}

impl FromStr for Weights {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "distance" => Ok(Self::Distance),
            other => Err(ModelError::invalid_parameter(
                "weights",
                format!("expected \"uniform\" or \"distance\", got {other:?}"),
            )),
        }
    }
}

/// Training data shared by both models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct Memory {
    x: Option<Array2<f64>>,
    y: Array1<f64>,
}

impl Memory {
    fn store(
        &mut self,
        x: &Array2<f64>,
        y: Option<&Array1<f64>>,
        n_neighbors: usize,
    ) -> ModelResult<()> {
        let y = y.ok_or_else(|| ModelError::fit("nearest neighbours need targets"))?;
        if y.len() != x.nrows() {
            return Err(ModelError::fit(format!(
                "{} samples but {} targets",
                x.nrows(),
                y.len()
            )));
        }
        if n_neighbors > x.nrows() {
            return Err(ModelError::fit(format!(
                "n_neighbors ({n_neighbors}) exceeds the {} training samples",
                x.nrows()
            )));
        }
        self.x = Some(x.clone());
        self.y = y.clone();
        Ok(())
    }

    /// The `k` closest (distance, target) pairs for every row of `x`,
    /// nearest first; equal distances keep training order.
    fn neighbours(&self, x: &Array2<f64>, k: usize) -> ModelResult<Vec<Vec<(f64, f64)>>> {
        let train = self.x.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != train.ncols() {
            return Err(ModelError::Predict {
                message: format!(
                    "fitted on {} features, got {}",
                    train.ncols(),
                    x.ncols()
                ),
            });
        }
        Ok(x
            .rows()
            .into_iter()
            .map(|point| {
                let mut scored: Vec<(f64, f64)> = train
                    .rows()
                    .into_iter()
                    .zip(self.y.iter())
                    .map(|(row, &target)| (euclidean(point, row), target))
                    .collect();
                scored.sort_by(|a, b| a.0.total_cmp(&b.0));
                scored.truncate(k);
                scored
            })
            .collect())
    }
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Apply `n_neighbors` and `weights`; anything else is an unknown parameter.
fn apply_params(
    params: &Candidate,
    n_neighbors: &mut usize,
    weights: &mut Weights,
) -> ModelResult<()> {
    for (name, value) in params.iter() {
        match name {
            "n_neighbors" => {
                *n_neighbors = value
                    .as_i64()
                    .and_then(|k| usize::try_from(k).ok())
                    .filter(|k| *k >= 1)
                    .ok_or_else(|| {
                        ModelError::invalid_parameter(
                            name,
                            format!("expected a positive integer, got {value}"),
                        )
                    })?;
            }
            "weights" => {
                *weights = match value {
                    ParameterValue::Str(s) => s.parse()?,
                    other => {
                        return Err(ModelError::invalid_parameter(
                            name,
                            format!("expected a string, got {other}"),
                        ))
                    }
                };
            }
            _ => return Err(ModelError::UnknownParameter { name: name.into() }),
        }
    }
    Ok(())
}

/// Predicts the (weighted) mean target of the nearest neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    pub n_neighbors: usize,
    pub weights: Weights,
    memory: Memory,
}

impl Default for KNeighborsRegressor {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KNeighborsRegressor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            weights: Weights::Uniform,
            memory: Memory::default(),
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }
}

impl Estimator for KNeighborsRegressor {
    fn set_params(&mut self, params: &Candidate) -> ModelResult<()> {
        apply_params(params, &mut self.n_neighbors, &mut self.weights)
    }

    fn fit(&mut self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<()> {
        self.memory.store(x, y, self.n_neighbors)
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let neighbours = self.memory.neighbours(x, self.n_neighbors)?;
        Ok(neighbours
            .iter()
            .map(|near| {
                let (sum, total) = near.iter().fold((0.0, 0.0), |(sum, total), &(d, y)| {
                    let w = self.weights.of(d);
                    (sum + w * y, total + w)
                });
                sum / total
            })
            .collect())
    }

    fn supports_score(&self) -> bool {
        true
    }

    fn score(&self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64> {
        let y = y.ok_or_else(|| ModelError::Score {
            message: "r2 needs targets".into(),
        })?;
        r2_score(y, &self.predict(x)?)
    }
}

/// Majority vote among the nearest neighbours; targets are rounded to class
/// labels. Vote ties go to the smallest label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsClassifier {
    pub n_neighbors: usize,
    pub weights: Weights,
    classes: Vec<i64>,
    memory: Memory,
}

impl Default for KNeighborsClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KNeighborsClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            weights: Weights::Uniform,
            classes: Vec::new(),
            memory: Memory::default(),
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Class labels seen during fit, ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Per-class vote weights, one row per sample, normalised to sum to one.
    fn votes(&self, x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        let neighbours = self.memory.neighbours(x, self.n_neighbors)?;
        let mut votes = Array2::zeros((neighbours.len(), self.classes.len()));
        for (mut row, near) in votes.rows_mut().into_iter().zip(&neighbours) {
            for &(d, label) in near {
                if let Ok(pos) = self.classes.binary_search(&(label.round() as i64)) {
                    row[pos] += self.weights.of(d);
                }
            }
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            }
        }
        Ok(votes)
    }
}

impl Estimator for KNeighborsClassifier {
    fn set_params(&mut self, params: &Candidate) -> ModelResult<()> {
        apply_params(params, &mut self.n_neighbors, &mut self.weights)
    }

    fn fit(&mut self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<()> {
        self.memory.store(x, y, self.n_neighbors)?;
        let mut classes: Vec<i64> = self.memory.y.iter().map(|v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();
        self.classes = classes;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        Ok(self
            .votes(x)?
            .rows()
            .into_iter()
            .map(|votes| {
                let mut best = 0;
                for (i, v) in votes.iter().enumerate() {
                    if *v > votes[best] {
                        best = i;
                    }
                }
                self.classes.get(best).copied().unwrap_or_default() as f64
            })
            .collect())
    }

    /// One column per entry of [`KNeighborsClassifier::classes`].
    fn predict_proba(&self, x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        self.votes(x)
    }

    fn supports_score(&self) -> bool {
        true
    }

    fn score(&self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64> {
        let y = y.ok_or_else(|| ModelError::Score {
            message: "accuracy needs targets".into(),
        })?;
        accuracy_score(y, &self.predict(x)?)
    }
}
