//! Capability interfaces for the collaborators a search consumes.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ModelError, ModelResult, SearchResult};
use crate::params::Candidate;

/// A trainable model.
///
/// `Clone` of an unfitted model must give an independent, unfitted copy;
/// the search only ever clones the base model it was given.
pub trait Estimator: Clone + Send + Sync + fmt::Debug {
    /// Apply a parameter assignment. Unknown names are an error.
    fn set_params(&mut self, params: &Candidate) -> ModelResult<()>;

    fn fit(&mut self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<()>;

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>>;

    /// Whether [`Estimator::score`] is implemented, i.e. whether a default
    /// scorer can be derived from this model.
    fn supports_score(&self) -> bool {
        false
    }

    fn score(&self, _x: &Array2<f64>, _y: Option<&Array1<f64>>) -> ModelResult<f64> {
        Err(ModelError::unsupported("score"))
    }

    fn predict_proba(&self, _x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        Err(ModelError::unsupported("predict_proba"))
    }

    fn decision_function(&self, _x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        Err(ModelError::unsupported("decision_function"))
    }

    fn transform(&self, _x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        Err(ModelError::unsupported("transform"))
    }

    fn inverse_transform(&self, _x: &Array2<f64>) -> ModelResult<Array2<f64>> {
        Err(ModelError::unsupported("inverse_transform"))
    }
}

/// Scores a fitted model on a sample set; greater is better.
pub trait Scorer<M>: Send + Sync {
    fn score(&self, model: &M, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<M, F> Scorer<M> for F
where
    F: Fn(&M, &Array2<f64>, Option<&Array1<f64>>) -> ModelResult<f64> + Send + Sync,
{
    fn score(&self, model: &M, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64> {
        self(model, x, y)
    }
}

/// One train/test partition of sample indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Cross-validation fold generator.
pub trait Splitter: Send + Sync + fmt::Debug {
    /// Ordered folds for `n_samples` samples; the number of folds is the
    /// length of the returned list.
    fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> SearchResult<Vec<Fold>>;
}
