//! Search configuration.

use hs_types::{config_error, SearchResult};
use serde::{Deserialize, Serialize};

/// What to do when fitting or scoring one (candidate, fold) unit fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorScoreRepr", into = "ErrorScoreRepr")]
pub enum ErrorScore {
    /// Abort the whole run.
    Raise,
    /// Record this score for the unit and keep going.
    Value(f64),
}

impl Default for ErrorScore {
    fn default() -> Self {
        Self::Raise
    }
}

/// Wire form: the string `"raise"` or a number.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ErrorScoreRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<ErrorScoreRepr> for ErrorScore {
    type Error = String;

    fn try_from(repr: ErrorScoreRepr) -> Result<Self, Self::Error> {
        match repr {
            ErrorScoreRepr::Number(v) => Ok(Self::Value(v)),
            ErrorScoreRepr::Text(s) if s == "raise" => Ok(Self::Raise),
            ErrorScoreRepr::Text(s) => Err(format!(
                "error_score must be \"raise\" or a number, got {s:?}"
            )),
        }
    }
}

impl From<ErrorScore> for ErrorScoreRepr {
    fn from(score: ErrorScore) -> Self {
        match score {
            ErrorScore::Raise => Self::Text("raise".to_string()),
            ErrorScore::Value(v) => Self::Number(v),
        }
    }
}

/// Seed policy for randomized search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomState {
    /// Fresh OS entropy on every run.
    Entropy,
    /// Fixed seed; identical inputs give identical candidates.
    Seed(u64),
}

impl Default for RandomState {
    fn default() -> Self {
        Self::Entropy
    }
}

/// Top-level configuration for a search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `1` runs sequentially, `n > 1` uses a pool of `n` workers, negative
    /// values count back from the CPU count (`-1` = every CPU).
    pub n_jobs: i32,

    /// Capacity of the work queue feeding the pool. Defaults to twice the
    /// worker count.
    pub pre_dispatch: Option<usize>,

    /// Weight fold scores by test-fold size when averaging.
    pub iid: bool,

    /// Refit the best candidate on the full data set after the search.
    pub refit: bool,

    pub error_score: ErrorScore,

    /// Progress reporting level. No effect on results.
    pub verbose: u8,

    pub random_state: RandomState,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_jobs: 1,
            pre_dispatch: None,
            iid: true,
            refit: true,
            error_score: ErrorScore::Raise,
            verbose: 0,
            random_state: RandomState::Entropy,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_jobs(mut self, n_jobs: i32) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_pre_dispatch(mut self, capacity: usize) -> Self {
        self.pre_dispatch = Some(capacity);
        self
    }

    pub fn with_iid(mut self, iid: bool) -> Self {
        self.iid = iid;
        self
    }

    pub fn with_refit(mut self, refit: bool) -> Self {
        self.refit = refit;
        self
    }

    pub fn with_error_score(mut self, error_score: ErrorScore) -> Self {
        self.error_score = error_score;
        self
    }

    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_random_state(mut self, random_state: RandomState) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random_state(RandomState::Seed(seed))
    }

    /// Resolve `n_jobs` to a worker count of at least one.
    pub fn workers(&self) -> SearchResult<usize> {
        match self.n_jobs {
            0 => Err(config_error!("n_jobs must be non-zero")),
            n if n > 0 => Ok(n as usize),
            n => {
                let cpus = std::thread::available_parallelism()
                    .map(|c| c.get())
                    .unwrap_or(1) as i64;
                Ok((cpus + 1 + i64::from(n)).max(1) as usize)
            }
        }
    }

    /// Work queue capacity for `workers` workers.
    pub fn queue_capacity(&self, workers: usize) -> usize {
        self.pre_dispatch.unwrap_or(2 * workers).max(1)
    }
}
