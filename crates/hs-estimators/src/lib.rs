//! # hs-estimators
//!
//! Small reference collaborators for hypersearch: k-fold splitters, ridge
//! regression, k-nearest-neighbours models and metric-based scorers. They
//! favour clarity over speed and are meant for tests, demos and small data.

mod kfold;
mod linear;
mod metrics;
mod neighbors;

pub use kfold::{KFold, StratifiedKFold};
pub use linear::RidgeRegression;
pub use metrics::{
    accuracy_score, mean_absolute_error, mean_squared_error, r2_score, Metric, MetricScorer,
};
pub use neighbors::{KNeighborsClassifier, KNeighborsRegressor, Weights};
