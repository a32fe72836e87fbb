use chrono::Local;
use serde::Serialize;

/// Successful prediction line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub current_price: f64,
    pub predicted_price: f64,
    pub predicted_change_percent: f64,
    pub confidence_score: f64,
    pub timestamp: String,
}

/// Line printed in place of a prediction when anything fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorOutput {
    pub error: String,
    pub timestamp: String,
}

impl ErrorOutput {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            timestamp: now_iso8601(),
        }
    }
}

/// Current local time, ISO-8601 with microseconds.
pub fn now_iso8601() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
