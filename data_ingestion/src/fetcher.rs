use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AlphaVantageConfig;
use crate::error::DataIngestionError;

pub const INTRADAY_FUNCTION: &str = "TIME_SERIES_INTRADAY";
pub const INTERVAL: &str = "5min";
pub const OUTPUT_SIZE: &str = "full";
pub const SERIES_KEY: &str = "Time Series (5min)";

const FETCH_FAILED: &str = "Failed to fetch data from Alpha Vantage";
// Keys the provider uses to explain an empty or rejected response.
const PROVIDER_MESSAGE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// One 5-minute OHLCV bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

// Bar as the provider sends it: numbers encoded as strings.
#[derive(Deserialize)]
struct RawBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

pub struct AlphaVantageClient {
    client: Client,
    config: AlphaVantageConfig,
}

impl AlphaVantageClient {
    pub fn new(config: AlphaVantageConfig) -> Result<Self, DataIngestionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }

    /// Fetch the full 5-minute intraday history for `symbol`.
    ///
    /// Bars come back in the order the provider listed them. No retry is
    /// attempted on failure.
    pub async fn fetch_intraday(&self, symbol: &str) -> Result<Vec<PriceBar>, DataIngestionError> {
        if !self.config.has_api_key() {
            warn!("ALPHA_VANTAGE_API_KEY is not set, requesting without a key");
        }

        let url = format!("{}/query", self.config.base_url.trim_end_matches('/'));
        info!("Fetching {} intraday bars for {}", INTERVAL, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", INTRADAY_FUNCTION),
                ("symbol", symbol),
                ("interval", INTERVAL),
                ("apikey", self.config.api_key.as_str()),
                ("outputsize", OUTPUT_SIZE),
            ])
            .send()
            .await?;

        let body: Value = response.json().await?;
        let bars = parse_intraday_response(&body)?;
        info!("Received {} bars for {}", bars.len(), symbol);

        Ok(bars)
    }
}

/// Extract the bars from a `TIME_SERIES_INTRADAY` response body.
pub fn parse_intraday_response(body: &Value) -> Result<Vec<PriceBar>, DataIngestionError> {
    let series = match body.get(SERIES_KEY).and_then(Value::as_object) {
        Some(series) => series,
        None => return Err(DataIngestionError::DataUnavailable(unavailable_message(body))),
    };

    let mut bars = Vec::with_capacity(series.len());
    for (timestamp, raw) in series {
        let raw: RawBar = serde_json::from_value(raw.clone())?;
        let bar = PriceBar {
            timestamp: timestamp.clone(),
            open: parse_field(timestamp, "open", &raw.open)?,
            high: parse_field(timestamp, "high", &raw.high)?,
            low: parse_field(timestamp, "low", &raw.low)?,
            close: parse_field(timestamp, "close", &raw.close)?,
            volume: parse_field(timestamp, "volume", &raw.volume)?,
        };
        if !validate_bar(&bar) {
            debug!("Keeping suspicious bar at {}", bar.timestamp);
        }
        bars.push(bar);
    }

    Ok(bars)
}

fn parse_field(timestamp: &str, field: &'static str, value: &str) -> Result<f64, DataIngestionError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| DataIngestionError::InvalidField {
            timestamp: timestamp.to_string(),
            field,
            value: value.to_string(),
        })
}

fn unavailable_message(body: &Value) -> String {
    let detail = PROVIDER_MESSAGE_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str));

    match detail {
        Some(detail) => format!("{}: {}", FETCH_FAILED, detail),
        None => FETCH_FAILED.to_string(),
    }
}

/// Warns about bars a sane feed would never produce. Such bars are still
/// returned to the caller.
pub fn validate_bar(bar: &PriceBar) -> bool {
    let mut is_valid = true;
    if bar.volume < 0.0 {
        warn!("Invalid volume at {}", bar.timestamp);
        is_valid = false;
    }

    if bar.open < 0.0 {
        warn!("Open cannot be negative at {}", bar.timestamp);
        is_valid = false;
    }

    if bar.close < 0.0 {
        warn!("Close cannot be negative at {}", bar.timestamp);
        is_valid = false;
    }

    if bar.high < 0.0 {
        warn!("High cannot be negative at {}", bar.timestamp);
        is_valid = false;
    }

    if bar.low < 0.0 {
        warn!("Low cannot be negative at {}", bar.timestamp);
        is_valid = false;
    }

    is_valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bar_json(open: &str, close: &str) -> Value {
        json!({
            "1. open": open,
            "2. high": "11.0",
            "3. low": "9.0",
            "4. close": close,
            "5. volume": "1500"
        })
    }

    #[test]
    fn parses_bars_in_provider_order() {
        let body = json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (5min)": {
                "2024-01-05 16:00:00": bar_json("10.5", "10.75"),
                "2024-01-05 15:55:00": bar_json("10.0", "10.5"),
                "2024-01-05 15:50:00": bar_json("9.5", "10.0"),
            }
        });

        let bars = parse_intraday_response(&body).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, "2024-01-05 16:00:00");
        assert_eq!(bars[2].timestamp, "2024-01-05 15:50:00");
        assert_eq!(bars[0].open, 10.5);
        assert_eq!(bars[0].close, 10.75);
        assert_eq!(bars[1].high, 11.0);
        assert_eq!(bars[1].low, 9.0);
        assert_eq!(bars[2].volume, 1500.0);
    }

    #[test]
    fn missing_series_is_data_unavailable() {
        let body = json!({ "Meta Data": {} });
        match parse_intraday_response(&body) {
            Err(DataIngestionError::DataUnavailable(msg)) => {
                assert_eq!(msg, "Failed to fetch data from Alpha Vantage");
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn provider_note_is_carried_into_message() {
        let body = json!({ "Note": "API call frequency exceeded" });
        let err = parse_intraday_response(&body).unwrap_err();
        assert!(matches!(err, DataIngestionError::DataUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Failed to fetch data from Alpha Vantage: API call frequency exceeded"
        );
    }

    #[test]
    fn unparsable_number_names_the_field() {
        let body = json!({
            "Time Series (5min)": {
                "2024-01-05 16:00:00": bar_json("ten", "10.75"),
            }
        });
        match parse_intraday_response(&body) {
            Err(DataIngestionError::InvalidField { timestamp, field, value }) => {
                assert_eq!(timestamp, "2024-01-05 16:00:00");
                assert_eq!(field, "open");
                assert_eq!(value, "ten");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn empty_series_yields_no_bars() {
        let body = json!({ "Time Series (5min)": {} });
        assert!(parse_intraday_response(&body).unwrap().is_empty());
    }

    #[test]
    fn negative_values_fail_validation() {
        let mut bar = PriceBar {
            timestamp: "t".into(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 100.0,
        };
        assert!(validate_bar(&bar));
        bar.volume = -1.0;
        assert!(!validate_bar(&bar));
    }
}
