//! Exhaustive parameter grids, addressable by index without materializing
//! the Cartesian product.
//!
//! Candidates are ordered sub-grid by sub-grid in declaration order. Inside
//! a sub-grid the parameter names, sorted in descending order, form a
//! mixed-radix number whose least significant digit is the lexicographically
//! greatest name: for `{"a": [1, 2], "b": [true, false]}` the order is
//! `{a: 1, b: true}`, `{a: 1, b: false}`, `{a: 2, b: true}`, `{a: 2, b: false}`.

use hs_types::{
    consistency_error, validation_error, Candidate, ParamDomain, ParameterSpec, ParameterValue,
    SearchResult,
};
use serde_json::Value;

/// An indexable, finite sequence of candidates whose elements may be
/// computed on demand.
pub trait CandidateSequence: Send + Sync {
    fn len(&self) -> usize;

    /// The candidate at `index`; fails for `index >= len()`.
    fn get(&self, index: usize) -> SearchResult<Candidate>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One Cartesian product. Axes are stored most-frequently-cycling first.
#[derive(Debug, Clone, PartialEq)]
struct SubGrid {
    axes: Vec<(String, Vec<ParameterValue>)>,
    size: usize,
}

impl SubGrid {
    fn from_spec(spec: &ParameterSpec) -> SearchResult<Self> {
        let mut axes = Vec::with_capacity(spec.len());
        let mut size: usize = 1;
        for (name, domain) in spec.iter().rev() {
            let values = match domain {
                ParamDomain::Values(values) => values,
                ParamDomain::Distribution(_) => {
                    return Err(validation_error!(
                        "parameter {name:?} is a distribution; a grid needs a finite list of values"
                    ))
                }
            };
            if values.is_empty() {
                return Err(validation_error!(
                    "parameter values for {name:?} should be a non-empty list"
                ));
            }
            size = size
                .checked_mul(values.len())
                .ok_or_else(|| validation_error!("grid size overflows at parameter {name:?}"))?;
            axes.push((name.to_string(), values.clone()));
        }
        Ok(Self { axes, size })
    }

    fn decode(&self, mut index: usize) -> Candidate {
        let mut candidate = Candidate::new();
        for (name, values) in &self.axes {
            let radix = values.len();
            candidate.insert(name.clone(), values[index % radix].clone());
            index /= radix;
        }
        candidate
    }
}

/// Exhaustive grid over one or more parameter specifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    subgrids: Vec<SubGrid>,
    len: usize,
}

impl ParameterGrid {
    /// Union of the given sub-grids, enumerated in order.
    pub fn new(specs: impl IntoIterator<Item = ParameterSpec>) -> SearchResult<Self> {
        let mut subgrids = Vec::new();
        let mut len: usize = 0;
        for spec in specs {
            let sub = SubGrid::from_spec(&spec)?;
            len = len
                .checked_add(sub.size)
                .ok_or_else(|| validation_error!("grid size overflows"))?;
            subgrids.push(sub);
        }
        Ok(Self { subgrids, len })
    }

    pub fn single(spec: ParameterSpec) -> SearchResult<Self> {
        Self::new([spec])
    }

    /// Build from JSON: one object, or an array of objects, mapping each
    /// parameter name to an array of scalar values.
    pub fn from_json(value: &Value) -> SearchResult<Self> {
        match value {
            Value::Object(_) => Self::single(spec_from_json(value)?),
            Value::Array(items) => {
                let specs = items
                    .iter()
                    .map(spec_from_json)
                    .collect::<SearchResult<Vec<_>>>()?;
                Self::new(specs)
            }
            other => Err(validation_error!(
                "a parameter grid must be an object or a list of objects, got {other}"
            )),
        }
    }

    /// Total number of candidates.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode the candidate at `index` without enumerating any other one.
    pub fn candidate_at(&self, index: usize) -> SearchResult<Candidate> {
        if index >= self.len {
            return Err(validation_error!(
                "candidate index {index} out of range for a grid of {} candidates",
                self.len
            ));
        }
        let mut offset = index;
        for sub in &self.subgrids {
            if offset < sub.size {
                return Ok(sub.decode(offset));
            }
            offset -= sub.size;
        }
        Err(consistency_error!(
            "index {index} passed the range check but no sub-grid holds it"
        ))
    }

    /// Candidates in ascending index order. Each call starts over.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            grid: self,
            front: 0,
            back: self.len,
        }
    }
}

impl CandidateSequence for ParameterGrid {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> SearchResult<Candidate> {
        self.candidate_at(index)
    }
}

impl CandidateSequence for Vec<Candidate> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> SearchResult<Candidate> {
        self.as_slice().get(index).cloned().ok_or_else(|| {
            validation_error!(
                "candidate index {index} out of range for {} candidates",
                self.as_slice().len()
            )
        })
    }
}

/// Lazy iterator over a [`ParameterGrid`].
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    grid: &'a ParameterGrid,
    front: usize,
    back: usize,
}

impl Iterator for GridIter<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.front >= self.back {
            return None;
        }
        let candidate = self.grid.candidate_at(self.front).ok();
        self.front += 1;
        candidate
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for GridIter<'_> {
    fn next_back(&mut self) -> Option<Candidate> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.grid.candidate_at(self.back).ok()
    }
}

impl ExactSizeIterator for GridIter<'_> {}

impl<'a> IntoIterator for &'a ParameterGrid {
    type Item = Candidate;
    type IntoIter = GridIter<'a>;

    fn into_iter(self) -> GridIter<'a> {
        self.iter()
    }
}

fn spec_from_json(value: &Value) -> SearchResult<ParameterSpec> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(validation_error!(
                "each sub-grid must be an object, got {other}"
            ))
        }
    };
    map.iter()
        .map(|(name, values)| {
            let items = match values {
                Value::Array(items) => items,
                other => {
                    return Err(validation_error!(
                        "parameter values for {name:?} should be a list, got {other}"
                    ))
                }
            };
            if !items.is_empty() && items.iter().all(Value::is_array) {
                return Err(validation_error!(
                    "parameter values for {name:?} should be one-dimensional"
                ));
            }
            let values = items
                .iter()
                .map(|item| value_from_json(name, item))
                .collect::<SearchResult<Vec<_>>>()?;
            Ok((name.clone(), ParamDomain::Values(values)))
        })
        .collect()
}

fn value_from_json(name: &str, value: &Value) -> SearchResult<ParameterValue> {
    match value {
        Value::Null => Ok(ParameterValue::Null),
        Value::Bool(b) => Ok(ParameterValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(ParameterValue::Int)
            .or_else(|| n.as_f64().map(ParameterValue::Float))
            .ok_or_else(|| validation_error!("unrepresentable number {n} for {name:?}")),
        Value::String(s) => Ok(ParameterValue::Str(s.clone())),
        other => Err(validation_error!(
            "unsupported value {other} for parameter {name:?}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Uniform;
    use hs_types::SearchError;
    use serde_json::json;

    fn spec_ab() -> ParameterSpec {
        ParameterSpec::new()
            .values("a", [1, 2])
            .values("b", [true, false])
    }

    #[test]
    fn lexicographically_last_name_varies_fastest() {
        let grid = ParameterGrid::single(spec_ab()).unwrap();
        let all: Vec<Candidate> = grid.iter().collect();
        assert_eq!(
            all,
            vec![
                Candidate::new().with("a", 1).with("b", true),
                Candidate::new().with("a", 1).with("b", false),
                Candidate::new().with("a", 2).with("b", true),
                Candidate::new().with("a", 2).with("b", false),
            ]
        );
    }

    #[test]
    fn empty_sub_grid_is_one_empty_candidate() {
        let grid = ParameterGrid::new([ParameterSpec::new(), ParameterSpec::new().values("k", [1, 10])])
            .unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.candidate_at(0).unwrap(), Candidate::new());
        assert_eq!(grid.candidate_at(1).unwrap(), Candidate::new().with("k", 1));
        assert_eq!(grid.candidate_at(2).unwrap(), Candidate::new().with("k", 10));
    }

    #[test]
    fn out_of_range_index_is_a_validation_error() {
        let grid = ParameterGrid::single(spec_ab()).unwrap();
        assert!(matches!(
            grid.candidate_at(4),
            Err(SearchError::Validation(_))
        ));
        let empty = ParameterGrid::new(Vec::new()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.candidate_at(0).is_err());
    }

    #[test]
    fn index_decoding_matches_nested_enumeration() {
        let spec = ParameterSpec::new()
            .values("alpha", [0.1, 1.0, 10.0])
            .values("kernel", ["linear", "rbf"])
            .values("degree", [2, 3, 4, 5]);
        let grid = ParameterGrid::new([spec, ParameterSpec::new().values("z", ["only"])]).unwrap();
        assert_eq!(grid.len(), 3 * 2 * 4 + 1);

        // Descending names: kernel (fastest), degree, alpha (slowest).
        let mut expected = Vec::new();
        for alpha in [0.1, 1.0, 10.0] {
            for degree in [2, 3, 4, 5] {
                for kernel in ["linear", "rbf"] {
                    expected.push(
                        Candidate::new()
                            .with("alpha", alpha)
                            .with("degree", degree)
                            .with("kernel", kernel),
                    );
                }
            }
        }
        expected.push(Candidate::new().with("z", "only"));

        for (i, want) in expected.iter().enumerate() {
            assert_eq!(&grid.candidate_at(i).unwrap(), want, "index {i}");
        }
        assert_eq!(grid.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn enumeration_has_no_duplicates_or_gaps() {
        let grid = ParameterGrid::new([
            ParameterSpec::new().values("x", [1, 2, 3]).values("y", [4, 5]),
            ParameterSpec::new().values("x", [7]).values("w", ["p", "q"]),
        ])
        .unwrap();
        let all: Vec<Candidate> = (0..grid.len()).map(|i| grid.candidate_at(i).unwrap()).collect();
        assert_eq!(all.len(), 8);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn iteration_is_restartable_and_exact_size() {
        let grid = ParameterGrid::single(spec_ab()).unwrap();
        let mut iter = grid.iter();
        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.len(), 3);
        assert_eq!(grid.iter().count(), 4);
        assert_eq!(
            grid.iter().next_back(),
            Some(Candidate::new().with("a", 2).with("b", false))
        );
        assert_eq!((&grid).into_iter().count(), 4);
    }

    #[test]
    fn empty_value_list_is_rejected() {
        let spec = ParameterSpec::new().values("a", Vec::<i64>::new());
        let err = ParameterGrid::single(spec).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn distribution_in_grid_is_rejected() {
        let spec = ParameterSpec::new().distribution("c", Uniform::new(0.0, 1.0).unwrap());
        assert!(matches!(
            ParameterGrid::single(spec),
            Err(SearchError::Validation(_))
        ));
    }

    #[test]
    fn json_grid_accepts_object_or_list() {
        let grid = ParameterGrid::from_json(&json!({"a": [1, 2], "b": [true, false]})).unwrap();
        assert_eq!(grid, ParameterGrid::single(spec_ab()).unwrap());

        let grid = ParameterGrid::from_json(&json!([{}, {"k": [1, 10]}])).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.candidate_at(0).unwrap(), Candidate::new());
        assert_eq!(grid.candidate_at(1).unwrap(), Candidate::new().with("k", 1));
        assert_eq!(grid.candidate_at(2).unwrap(), Candidate::new().with("k", 10));
    }

    #[test]
    fn json_grid_validation() {
        let not_a_list = ParameterGrid::from_json(&json!({"a": 1})).unwrap_err();
        assert!(not_a_list.to_string().contains("should be a list"));

        let empty = ParameterGrid::from_json(&json!({"a": []})).unwrap_err();
        assert!(empty.to_string().contains("non-empty"));

        let matrix = ParameterGrid::from_json(&json!({"a": [[1, 2], [3, 4]]})).unwrap_err();
        assert!(matrix.to_string().contains("one-dimensional"));

        assert!(ParameterGrid::from_json(&json!("grid")).is_err());
        assert!(ParameterGrid::from_json(&json!([{"a": [1]}, 3])).is_err());
    }

    #[test]
    fn materialized_candidates_are_a_sequence() {
        let seq = vec![Candidate::new().with("a", 1), Candidate::new().with("a", 2)];
        assert_eq!(CandidateSequence::len(&seq), 2);
        assert_eq!(seq.get(1).unwrap(), Candidate::new().with("a", 2));
        assert!(CandidateSequence::get(&seq, 2).is_err());
    }
}
