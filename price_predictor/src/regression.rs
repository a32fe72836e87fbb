//! Ordinary least squares with an intercept.
//!
//! The model centres the inputs, solves the normal equations by Gaussian
//! elimination with partial pivoting and recovers the intercept from the
//! means. Collinear directions get a zero coefficient.

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

// Pivots below this fraction of the largest diagonal entry are treated as zero.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("Model has not been fitted yet")]
    NotFitted,

    #[error("Cannot fit on an empty training set")]
    Empty,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
    r_squared: Option<f64>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    /// In-sample coefficient of determination from the last fit.
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), RegressionError> {
        if x.nrows() != y.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let x_mean = x.mean_axis(Axis(0)).ok_or(RegressionError::Empty)?;
        let y_mean = y.mean().ok_or(RegressionError::Empty)?;

        let xc = x - &x_mean;
        let yc = y - y_mean;
        let xtx = xc.t().dot(&xc);
        let xty = xc.t().dot(&yc);

        let coefficients = solve_least_squares(xtx, xty);
        let intercept = y_mean - x_mean.dot(&coefficients);

        let fitted = x.dot(&coefficients) + intercept;
        let ss_res: f64 = y
            .iter()
            .zip(fitted.iter())
            .map(|(&yi, &fi)| (yi - fi).powi(2))
            .sum();
        let ss_tot: f64 = yc.iter().map(|v| v * v).sum();
        let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.r_squared = Some(r_squared);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, RegressionError> {
        let coefficients = self.coefficients.as_ref().ok_or(RegressionError::NotFitted)?;
        let intercept = self.intercept.ok_or(RegressionError::NotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: coefficients.len(),
                got: x.ncols(),
            });
        }

        Ok(x.dot(coefficients) + intercept)
    }
}

/// Solve `a * w = b` for a symmetric positive semi-definite `a`.
fn solve_least_squares(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let max_diag = a.diag().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = RANK_TOLERANCE * max_diag.max(f64::MIN_POSITIVE);

    // (row, column) of every accepted pivot
    let mut pivots = Vec::with_capacity(n);
    let mut row = 0;
    for column in 0..n {
        if row == n {
            break;
        }
        let best = (row..n)
            .max_by(|&i, &j| a[[i, column]].abs().total_cmp(&a[[j, column]].abs()))
            .unwrap_or(row);
        if a[[best, column]].abs() <= tolerance {
            continue;
        }
        if best != row {
            for k in 0..n {
                a.swap([row, k], [best, k]);
            }
            b.swap(row, best);
        }
        for i in (row + 1)..n {
            let factor = a[[i, column]] / a[[row, column]];
            if factor == 0.0 {
                continue;
            }
            for k in column..n {
                let delta = factor * a[[row, k]];
                a[[i, k]] -= delta;
            }
            let delta = factor * b[row];
            b[i] -= delta;
        }
        pivots.push((row, column));
        row += 1;
    }

    let mut w = Array1::<f64>::zeros(n);
    for &(row, column) in pivots.iter().rev() {
        let tail: f64 = ((column + 1)..n).map(|k| a[[row, k]] * w[k]).sum();
        w[column] = (b[row] - tail) / a[[row, column]];
    }
    w
}
