//! Run lifecycle tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique search run identifier.
pub type RunId = Uuid;

/// Lifecycle state of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    Idle,
    Dispatching,
    Aggregating,
    Selecting,
    Refitting,
    Done,
    Failed,
}

/// Aggregate status of the most recent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub id: RunId,
    pub state: SearchState,
    pub n_candidates: usize,
    pub n_folds: usize,
    /// Units that produced a score, real or substituted.
    pub units_completed: usize,
    /// Units whose score came from the error-score fallback.
    pub units_substituted: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl SearchStatus {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SearchState::Idle,
            n_candidates: 0,
            n_folds: 0,
            units_completed: 0,
            units_substituted: 0,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_dispatching(&mut self, n_candidates: usize, n_folds: usize) {
        self.state = SearchState::Dispatching;
        self.n_candidates = n_candidates;
        self.n_folds = n_folds;
        self.started_at = Some(Utc::now());
    }

    pub fn advance(&mut self, state: SearchState) {
        self.state = state;
    }

    pub fn mark_done(&mut self) {
        self.state = SearchState::Done;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = SearchState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }

    pub fn total_units(&self) -> usize {
        self.n_candidates * self.n_folds
    }
}

impl Default for SearchStatus {
    fn default() -> Self {
        Self::new()
    }
}
