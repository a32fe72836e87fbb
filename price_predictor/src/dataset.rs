use feature_processing::misc::CLOSE;
use feature_processing::processor::column_values;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;

use crate::error::PredictorError;

pub const MIN_TRAINING_EXAMPLES: usize = 2;

/// Feature rows paired with the close of the following row.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl TrainingSet {
    /// Inputs are the `features` columns in order. The last row of `table`
    /// has no next close and is left out.
    pub fn from_feature_table(
        table: &DataFrame,
        features: &[&str],
    ) -> Result<Self, PredictorError> {
        let rows = table.height();
        let examples = rows.saturating_sub(1);
        if examples < MIN_TRAINING_EXAMPLES {
            return Err(PredictorError::InsufficientData {
                required: MIN_TRAINING_EXAMPLES,
                available: examples,
            });
        }

        let mut matrix = Array2::<f64>::zeros((examples, features.len()));
        for (j, name) in features.iter().enumerate() {
            let values = column_values(table, name)?;
            for (i, value) in values.into_iter().take(examples).enumerate() {
                matrix[[i, j]] = value;
            }
        }

        let close = column_values(table, CLOSE)?;
        let labels = Array1::from_iter(close.into_iter().skip(1));

        Ok(Self {
            features: matrix,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
