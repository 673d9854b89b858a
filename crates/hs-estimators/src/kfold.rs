//! K-fold cross-validation splitters.

use hs_types::{validation_error, Fold, SearchResult, Splitter};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn check_sizes(n_samples: usize, n_splits: usize) -> SearchResult<()> {
    if n_splits < 2 {
        return Err(validation_error!(
            "n_splits must be at least 2, got {n_splits}"
        ));
    }
    if n_samples < n_splits {
        return Err(validation_error!(
            "n_samples ({n_samples}) must be >= n_splits ({n_splits})"
        ));
    }
    Ok(())
}

fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Turn per-fold test sets into folds; the training set of each fold is
/// every other fold's test set, in fold order.
fn folds_from_tests(tests: Vec<Vec<usize>>) -> Vec<Fold> {
    (0..tests.len())
        .map(|k| {
            let train = tests
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != k)
                .flat_map(|(_, t)| t.iter().copied())
                .collect();
            Fold {
                train,
                test: tests[k].clone(),
            }
        })
        .collect()
}

/// Contiguous folds; the first `n_samples % n_splits` folds get one extra
/// sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    /// Shuffle seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for KFold {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }
}

impl Splitter for KFold {
    fn split(&self, n_samples: usize, _y: Option<&Array1<f64>>) -> SearchResult<Vec<Fold>> {
        check_sizes(n_samples, self.n_splits)?;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            indices.shuffle(&mut rng_for(self.seed));
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        let mut tests = Vec::with_capacity(self.n_splits);
        let mut current = 0;
        for k in 0..self.n_splits {
            let size = if k < remainder { base + 1 } else { base };
            tests.push(indices[current..current + size].to_vec());
            current += size;
        }
        Ok(folds_from_tests(tests))
    }
}

/// Folds that preserve the class balance of `y`.
///
/// Targets are rounded to integer class labels. Samples of each class are
/// dealt round-robin across folds, continuing where the previous class
/// stopped so fold sizes differ by at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self::new(5)
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }
}

impl Splitter for StratifiedKFold {
    fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> SearchResult<Vec<Fold>> {
        let y = y.ok_or_else(|| validation_error!("StratifiedKFold requires a target array"))?;
        if y.len() != n_samples {
            return Err(validation_error!(
                "StratifiedKFold got {} targets for {n_samples} samples",
                y.len()
            ));
        }
        check_sizes(n_samples, self.n_splits)?;

        let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &label) in y.iter().enumerate() {
            classes.entry(label.round() as i64).or_default().push(idx);
        }
        if self.shuffle {
            let mut rng = rng_for(self.seed);
            for members in classes.values_mut() {
                members.shuffle(&mut rng);
            }
        }

        let mut tests: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        let mut slot = 0;
        for members in classes.values() {
            for &idx in members {
                tests[slot % self.n_splits].push(idx);
                slot += 1;
            }
        }
        for test in &mut tests {
            test.sort_unstable();
        }
        Ok(folds_from_tests(tests))
    }
}
