//! Bounded random sampling of candidates.

use hs_types::{validation_error, Candidate, ParamDomain, ParameterSpec, SearchResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::RandomState;

/// ChaCha stream used for distribution draws; list draws use stream 0.
const DISTRIBUTION_STREAM: u64 = 1;

/// Produces exactly `n_iter` independent candidates.
///
/// List-valued parameters are drawn uniformly with replacement from one
/// random stream, distributions from another, so the list draws do not
/// depend on which parameters are distributions. Names are visited in
/// ascending order. Duplicates are not removed.
#[derive(Debug, Clone)]
pub struct ParameterSampler {
    params: Vec<(String, ParamDomain)>,
    remaining: usize,
    list_rng: ChaCha8Rng,
    dist_rng: ChaCha8Rng,
}

impl ParameterSampler {
    pub fn new(spec: &ParameterSpec, n_iter: usize, random_state: RandomState) -> SearchResult<Self> {
        let mut params = Vec::with_capacity(spec.len());
        for (name, domain) in spec.iter() {
            if let ParamDomain::Values(values) = domain {
                if values.is_empty() {
                    return Err(validation_error!(
                        "parameter values for {name:?} should be a non-empty list"
                    ));
                }
            }
            params.push((name.to_string(), domain.clone()));
        }

        let (list_rng, dist_rng) = match random_state {
            RandomState::Seed(seed) => {
                let mut dist_rng = ChaCha8Rng::seed_from_u64(seed);
                dist_rng.set_stream(DISTRIBUTION_STREAM);
                (ChaCha8Rng::seed_from_u64(seed), dist_rng)
            }
            RandomState::Entropy => (ChaCha8Rng::from_entropy(), ChaCha8Rng::from_entropy()),
        };

        Ok(Self {
            params,
            remaining: n_iter,
            list_rng,
            dist_rng,
        })
    }

    /// Reseed the distribution stream independently of the list stream.
    pub fn with_distribution_seed(mut self, seed: u64) -> Self {
        self.dist_rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Draw every remaining candidate.
    pub fn sample_all(self) -> Vec<Candidate> {
        self.collect()
    }
}

impl Iterator for ParameterSampler {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let mut candidate = Candidate::new();
        for (name, domain) in &self.params {
            let value = match domain {
                ParamDomain::Values(values) => {
                    values[self.list_rng.gen_range(0..values.len())].clone()
                }
                ParamDomain::Distribution(dist) => dist.draw(&mut self.dist_rng),
            };
            candidate.insert(name.clone(), value);
        }
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ParameterSampler {}
