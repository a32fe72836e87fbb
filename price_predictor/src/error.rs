use data_ingestion::error::DataIngestionError;
use polars::prelude::PolarsError;
use thiserror::Error;

use crate::regression::RegressionError;
use crate::scaler::ScalerError;

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error(transparent)]
    Ingestion(#[from] DataIngestionError),

    #[error("Feature processing error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Insufficient data: need at least {required} training examples, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Scaler error: {0}")]
    Scaler(#[from] ScalerError),

    #[error("Regression error: {0}")]
    Regression(#[from] RegressionError),

    #[error("Invalid distribution: {0}")]
    Distribution(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PredictorError {
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            PredictorError::Ingestion(DataIngestionError::DataUnavailable(_))
        )
    }
}
