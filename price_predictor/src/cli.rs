use std::io::Write;

use data_ingestion::config::AlphaVantageConfig;
use log::error;
use thiserror::Error;

use crate::engine::{PricePredictor, write_error};

pub const USAGE: &str = "Usage: price_predictor <symbol>";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Exactly one positional argument, the symbol. `args` excludes the
/// program name.
pub fn parse_symbol<I>(args: I) -> Result<String, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(UsageError(USAGE.to_string())),
    }
}

/// Run one invocation and return the process exit code. Exactly one JSON
/// line is written to `out`.
pub fn run<I, W>(args: I, config: Result<AlphaVantageConfig, config::ConfigError>, out: &mut W) -> i32
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    let symbol = match parse_symbol(args) {
        Ok(symbol) => symbol,
        Err(e) => {
            write_error(out, &e);
            return 1;
        }
    };

    let predictor = match config
        .map_err(|e| e.to_string())
        .and_then(|config| PricePredictor::new(config).map_err(|e| e.to_string()))
    {
        Ok(predictor) => predictor,
        Err(e) => {
            error!("Failed to set up predictor: {}", e);
            write_error(out, &e);
            return 1;
        }
    };

    if predictor.predict(&symbol, out) { 0 } else { 1 }
}
