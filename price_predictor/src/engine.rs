use std::io::Write;

use data_ingestion::config::AlphaVantageConfig;
use data_ingestion::fetcher::AlphaVantageClient;
use feature_processing::misc::{BASE_FEATURES, FeatureConfig};
use feature_processing::processor::{derive_features, to_dataframe};
use log::{error, info};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::dataset::TrainingSet;
use crate::error::PredictorError;
use crate::misc::{ErrorOutput, Prediction, now_iso8601};
use crate::regression::LinearRegression;
use crate::scaler::StandardScaler;

pub const CURRENT_PRICE: f64 = 100.0;
pub const PRICE_NOISE_STD: f64 = 0.02;
pub const CONFIDENCE_SCORE: f64 = 0.75;

pub struct PricePredictor {
    client: AlphaVantageClient,
    feature_config: FeatureConfig,
    model: LinearRegression,
    scaler: StandardScaler,
    features: [&'static str; 5],
}

impl PricePredictor {
    pub fn new(config: AlphaVantageConfig) -> Result<Self, PredictorError> {
        Ok(Self {
            client: AlphaVantageClient::new(config)?,
            feature_config: FeatureConfig::default(),
            model: LinearRegression::new(),
            scaler: StandardScaler::new(),
            features: BASE_FEATURES,
        })
    }

    pub fn with_feature_config(mut self, feature_config: FeatureConfig) -> Self {
        self.feature_config = feature_config;
        self
    }

    pub fn features(&self) -> &[&'static str] {
        &self.features
    }

    pub fn model(&self) -> &LinearRegression {
        &self.model
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_fitted() && self.scaler.is_fitted()
    }

    /// Fit the scaler and the regression on the symbol's intraday history,
    /// predicting each bar's next close from its OHLCV values.
    pub async fn train(&mut self, symbol: &str) -> Result<(), PredictorError> {
        let bars = self.client.fetch_intraday(symbol).await?;
        let raw = to_dataframe(&bars)?;
        let table = derive_features(raw, &self.feature_config)?;
        let set = TrainingSet::from_feature_table(&table, &self.features)?;

        let scaled = self.scaler.fit_transform(&set.features)?;
        self.model.fit(&scaled, &set.labels)?;

        info!(
            "Trained {} on {} examples (R² {:.4})",
            symbol,
            set.len(),
            self.model.r_squared().unwrap_or(f64::NAN)
        );
        Ok(())
    }

    /// Mock forecast: a normally perturbed fixed price. The fitted model is
    /// not consulted.
    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        symbol: &str,
        rng: &mut R,
    ) -> Result<Prediction, PredictorError> {
        info!("Predicting {}", symbol);
        let noise = Normal::new(0.0, PRICE_NOISE_STD)
            .map_err(|e| PredictorError::Distribution(e.to_string()))?;

        let current_price = CURRENT_PRICE;
        let predicted_price = current_price * (1.0 + noise.sample(rng));

        Ok(Prediction {
            current_price,
            predicted_price,
            predicted_change_percent: (predicted_price - current_price) / current_price * 100.0,
            confidence_score: CONFIDENCE_SCORE,
            timestamp: now_iso8601(),
        })
    }

    /// Write one JSON line to `out`: the prediction, or an error object.
    /// Returns whether a prediction was written.
    pub fn predict<W: Write>(&self, symbol: &str, out: &mut W) -> bool {
        self.predict_into(symbol, &mut rand::thread_rng(), out)
    }

    pub fn predict_into<R: Rng + ?Sized, W: Write>(
        &self,
        symbol: &str,
        rng: &mut R,
        out: &mut W,
    ) -> bool {
        let line = self
            .predict_with_rng(symbol, rng)
            .and_then(|prediction| Ok(serde_json::to_string(&prediction)?));

        match line {
            Ok(line) => match writeln!(out, "{}", line) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to write prediction: {}", e);
                    false
                }
            },
            Err(e) => {
                error!("Prediction for {} failed: {}", symbol, e);
                write_error(out, &e);
                false
            }
        }
    }
}

/// Write an `{error, timestamp}` line.
pub fn write_error<W: Write>(out: &mut W, err: &dyn std::fmt::Display) {
    let payload = ErrorOutput::new(err);
    match serde_json::to_string(&payload) {
        Ok(line) => {
            if let Err(e) = writeln!(out, "{}", line) {
                error!("Failed to write error output: {}", e);
            }
        }
        Err(e) => error!("Failed to serialize error output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::Value;

    fn predictor() -> PricePredictor {
        PricePredictor::new(AlphaVantageConfig::new("test")).unwrap()
    }

    #[test]
    fn starts_untrained() {
        let p = predictor();
        assert!(!p.is_trained());
        assert_eq!(p.features(), &["open", "high", "low", "close", "volume"]);
    }

    #[test]
    fn change_percent_follows_predicted_price() {
        let p = predictor();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let prediction = p.predict_with_rng("IBM", &mut rng).unwrap();
            assert_eq!(prediction.current_price, 100.0);
            assert_eq!(prediction.confidence_score, 0.75);
            assert_eq!(
                prediction.predicted_change_percent,
                (prediction.predicted_price - 100.0) / 100.0 * 100.0
            );
            // ten standard deviations of noise
            assert!((prediction.predicted_price - 100.0).abs() < 20.0);
        }
    }

    #[test]
    fn seeded_predictions_repeat() {
        let p = predictor();
        let a = p.predict_with_rng("IBM", &mut StdRng::seed_from_u64(42)).unwrap();
        let b = p.predict_with_rng("IBM", &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.predicted_price, b.predicted_price);
    }

    #[test]
    fn predict_writes_one_json_line() {
        let p = predictor();
        let mut out = Vec::new();
        assert!(p.predict("AAPL", &mut out));

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);

        let value: Value = serde_json::from_str(text.trim_end()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "current_price",
                "predicted_price",
                "predicted_change_percent",
                "confidence_score",
                "timestamp"
            ]
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_output_reports_failure() {
        let p = predictor();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!p.predict_into("IBM", &mut rng, &mut BrokenPipe));
        assert!(!p.predict("IBM", &mut BrokenPipe));
    }

    #[test]
    fn error_line_has_error_and_timestamp() {
        let mut out = Vec::new();
        let err = PredictorError::Distribution("bad sigma".into());
        write_error(&mut out, &err);

        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["error"], "Invalid distribution: bad sigma");
        assert!(value["timestamp"].is_string());
    }
}
