//! L2-regularised linear regression.

use hs_types::{Candidate, Estimator, ModelError, ModelResult};
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::metrics::r2_score;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
/// Returns `None` for a singular system.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        let pivot_row = a.row(col).to_owned();
        for row in col + 1..n {
            let factor = a[[row, col]] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            a.row_mut(row).scaled_add(-factor, &pivot_row);
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail = a.slice(s![row, row + 1..]).dot(&x.slice(s![row + 1..]));
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

/// Ridge regression fitted through the normal equations
/// `(XᵀX + alpha·I) w = Xᵀy` on centred data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    /// L2 regularisation strength
    pub alpha: f64,
    pub fit_intercept: bool,
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

impl Estimator for RidgeRegression {
    fn set_params(&mut self, params: &Candidate) -> ModelResult<()> {
        for (name, value) in params.iter() {
            match name {
                "alpha" => {
                    let alpha = value
                        .as_f64()
                        .filter(|a| *a >= 0.0)
                        .ok_or_else(|| {
                            ModelError::invalid_parameter(
                                name,
                                format!("expected a non-negative number, got {value}"),
                            )
                        })?;
                    self.alpha = alpha;
                }
                "fit_intercept" => {
                    self.fit_intercept = value.as_bool().ok_or_else(|| {
                        ModelError::invalid_parameter(name, format!("expected a bool, got {value}"))
                    })?;
                }
                _ => return Err(ModelError::UnknownParameter { name: name.into() }),
            }
        }
        Ok(())
    }

    fn fit(&mut self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<()> {
        let y = y.ok_or_else(|| ModelError::fit("ridge regression needs targets"))?;
        let n = x.nrows();
        if n != y.len() {
            return Err(ModelError::fit(format!(
                "{n} samples but {} targets",
                y.len()
            )));
        }
        let x_mean = match x.mean_axis(Axis(0)) {
            Some(mean) if self.fit_intercept => mean,
            Some(_) => Array1::zeros(x.ncols()),
            None => return Err(ModelError::fit("cannot fit on an empty sample")),
        };
        let y_mean = if self.fit_intercept {
            y.mean().unwrap_or(0.0)
        } else {
            0.0
        };

        let x_c = x - &x_mean.view().insert_axis(Axis(0));
        let y_c = y - y_mean;
        let mut xtx = x_c.t().dot(&x_c);
        xtx.diag_mut().mapv_inplace(|d| d + self.alpha);
        let xty = x_c.t().dot(&y_c);

        let coefficients = solve(xtx, xty)
            .ok_or_else(|| ModelError::fit("singular matrix; try a larger alpha"))?;
        self.intercept = y_mean - coefficients.dot(&x_mean);
        trace!(alpha = self.alpha, intercept = self.intercept, "ridge fitted");
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(ModelError::Predict {
                message: format!(
                    "fitted on {} features, got {}",
                    coefficients.len(),
                    x.ncols()
                ),
            });
        }
        Ok(x.dot(coefficients) + self.intercept)
    }

    fn supports_score(&self) -> bool {
        true
    }

    fn score(&self, x: &Array2<f64>, y: Option<&Array1<f64>>) -> ModelResult<f64> {
        let y = y.ok_or_else(|| ModelError::Score {
            message: "r2 needs targets".into(),
        })?;
        r2_score(y, &self.predict(x)?)
    }
}
