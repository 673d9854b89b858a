//! Sample data: `Array2<f64>` features with one row per sample and
//! `Array1<f64>` targets.

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

use crate::errors::SearchResult;
use crate::validation_error;

fn check_indices(indices: &[usize], len: usize, what: &str) -> SearchResult<()> {
    match indices.iter().find(|&&i| i >= len) {
        Some(i) => Err(validation_error!(
            "index {} out of range for {} {}",
            i,
            len,
            what
        )),
        None => Ok(()),
    }
}

/// Copy the given rows, in the given order, into a new matrix.
pub fn select_rows<S>(x: &ArrayBase<S, Ix2>, indices: &[usize]) -> SearchResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    check_indices(indices, x.nrows(), "samples")?;
    Ok(x.select(Axis(0), indices))
}

/// Gather `y[i]` for every index, failing on out-of-range indices.
pub fn select<S>(y: &ArrayBase<S, Ix1>, indices: &[usize]) -> SearchResult<Array1<f64>>
where
    S: Data<Elem = f64>,
{
    check_indices(indices, y.len(), "targets")?;
    Ok(y.select(Axis(0), indices))
}

/// Single-feature matrix.
pub fn column(values: Vec<f64>) -> Array2<f64> {
    Array1::from(values).insert_axis(Axis(1))
}
