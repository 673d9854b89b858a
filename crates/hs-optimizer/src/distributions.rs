//! Stock distributions for randomized search.

use hs_types::{validation_error, Distribution, ParameterValue, SearchResult};
use rand::distributions::WeightedIndex;
use rand::{Rng, RngCore};
use rand_distr::Distribution as _;

/// Continuous uniform range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    pub fn new(low: f64, high: f64) -> SearchResult<Self> {
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(validation_error!("invalid uniform range [{low}, {high}]"));
        }
        Ok(Self { low, high })
    }
}

impl Distribution for Uniform {
    fn draw(&self, rng: &mut dyn RngCore) -> ParameterValue {
        ParameterValue::Float(rng.gen_range(self.low..=self.high))
    }
}

/// Log-uniform range (sampled in log-space then exponentiated).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogUniform {
    log_low: f64,
    log_high: f64,
}

impl LogUniform {
    pub fn new(low: f64, high: f64) -> SearchResult<Self> {
        if !(low > 0.0 && high.is_finite()) || low > high {
            return Err(validation_error!(
                "invalid log-uniform range [{low}, {high}]; bounds must be positive"
            ));
        }
        Ok(Self {
            log_low: low.ln(),
            log_high: high.ln(),
        })
    }
}

impl Distribution for LogUniform {
    fn draw(&self, rng: &mut dyn RngCore) -> ParameterValue {
        let log_val: f64 = rng.gen_range(self.log_low..=self.log_high);
        ParameterValue::Float(log_val.exp())
    }
}

/// Integer range `[low, high]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandInt {
    low: i64,
    high: i64,
}

impl RandInt {
    pub fn new(low: i64, high: i64) -> SearchResult<Self> {
        if low > high {
            return Err(validation_error!("invalid integer range [{low}, {high}]"));
        }
        Ok(Self { low, high })
    }
}

impl Distribution for RandInt {
    fn draw(&self, rng: &mut dyn RngCore) -> ParameterValue {
        ParameterValue::Int(rng.gen_range(self.low..=self.high))
    }
}

/// Gaussian with the given mean and standard deviation.
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    inner: rand_distr::Normal<f64>,
}

impl Normal {
    /// `std_dev` must be finite and non-negative.
    pub fn new(mean: f64, std_dev: f64) -> SearchResult<Self> {
        // rand_distr only rejects non-finite deviations
        if std_dev < 0.0 {
            return Err(validation_error!("normal std_dev must be non-negative, got {std_dev}"));
        }
        let inner = rand_distr::Normal::new(mean, std_dev)
            .map_err(|e| validation_error!("invalid normal distribution: {e}"))?;
        Ok(Self { inner })
    }
}

impl Distribution for Normal {
    fn draw(&self, rng: &mut dyn RngCore) -> ParameterValue {
        ParameterValue::Float(self.inner.sample(rng))
    }
}

/// Weighted choice over a fixed set of values.
#[derive(Debug, Clone)]
pub struct Categorical {
    values: Vec<ParameterValue>,
    index: WeightedIndex<f64>,
}

impl Categorical {
    /// Equal weight for every value.
    pub fn new<I, V>(values: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParameterValue>,
    {
        let values: Vec<ParameterValue> = values.into_iter().map(Into::into).collect();
        let weights = vec![1.0; values.len()];
        Self::weighted(values, weights)
    }

    pub fn weighted(values: Vec<ParameterValue>, weights: Vec<f64>) -> SearchResult<Self> {
        if values.is_empty() {
            return Err(validation_error!("categorical distribution needs at least one value"));
        }
        if values.len() != weights.len() {
            return Err(validation_error!(
                "{} categorical values but {} weights",
                values.len(),
                weights.len()
            ));
        }
        let index = WeightedIndex::new(&weights)
            .map_err(|e| validation_error!("invalid categorical weights: {e}"))?;
        Ok(Self { values, index })
    }
}

impl Distribution for Categorical {
    fn draw(&self, rng: &mut dyn RngCore) -> ParameterValue {
        self.values[self.index.sample(rng)].clone()
    }
}
