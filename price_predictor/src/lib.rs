pub mod cli;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod misc;
pub mod regression;
pub mod scaler;

pub use engine::PricePredictor;
pub use error::PredictorError;
pub use misc::{ErrorOutput, Prediction};
