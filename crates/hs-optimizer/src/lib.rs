//! # hs-optimizer
//!
//! Cross-validated hyperparameter search.
//!
//! Provides the exhaustive parameter grid, the seeded random sampler, the
//! per-fold evaluator, the worker-pool dispatch of (candidate, fold) units and
//! the `SearchCv` orchestrator that aggregates fold scores, selects the best
//! candidate and optionally refits it on the full data.

mod aggregate;
mod config;
mod dispatch;
mod distributions;
mod evaluator;
mod grid;
mod sampler;
mod search;
mod status;

pub use aggregate::{aggregate, select_best, CandidateScore};
pub use config::{ErrorScore, RandomState, SearchConfig};
pub use dispatch::{execute, plan, WorkUnit};
pub use distributions::{Categorical, LogUniform, Normal, RandInt, Uniform};
pub use evaluator::{EstimatorScore, FoldEvaluator, FoldResult};
pub use grid::{CandidateSequence, GridIter, ParameterGrid};
pub use sampler::ParameterSampler;
pub use search::{SearchCv, SearchOutcome, SearchStrategy};
pub use status::{RunId, SearchState, SearchStatus};
