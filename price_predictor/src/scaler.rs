use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScalerError {
    #[error("Scaler has not been fitted yet")]
    NotFitted,

    #[error("Cannot fit a scaler on an empty matrix")]
    Empty,

    #[error("Dimension mismatch: expected {expected} columns, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Per-column standardisation to zero mean and unit variance.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }

    /// Learn column means and population standard deviations. Constant
    /// columns get a scale of 1.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<(), ScalerError> {
        let mean = x.mean_axis(Axis(0)).ok_or(ScalerError::Empty)?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = std
            .iter()
            .zip(mean.iter())
            .map(|(&s, &m)| if s <= 1e-12 * m.abs().max(1.0) { 1.0 } else { s })
            .collect::<Array1<f64>>();

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        let mean = self.mean.as_ref().ok_or(ScalerError::NotFitted)?;
        let scale = self.scale.as_ref().ok_or(ScalerError::NotFitted)?;
        if x.ncols() != mean.len() {
            return Err(ScalerError::DimensionMismatch {
                expected: mean.len(),
                got: x.ncols(),
            });
        }

        Ok((x - mean) / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        self.fit(x)?;
        self.transform(x)
    }
}
