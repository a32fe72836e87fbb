use config;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataIngestionError {
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Config not found: {0}")]
    ConfigValueNotFoundError(#[from] config::ConfigError),

    #[error("{0}")]
    DataUnavailable(String),

    #[error("Invalid {field} value {value:?} at {timestamp}")]
    InvalidField {
        timestamp: String,
        field: &'static str,
        value: String,
    },
}
