use data_ingestion::fetcher::PriceBar;
use log::debug;
use polars::prelude::*;

use crate::misc::{
    BASE_FEATURES, CLOSE, DERIVED_FEATURES, FeatureConfig, HIGH, LOW, OPEN, PRICE_MOMENTUM,
    SMA_LONG, SMA_SHORT, TIMESTAMP, VOLATILITY, VOLUME, VOLUME_MOMENTUM,
};

/// Build the raw OHLCV table, keeping the order of `bars`.
pub fn to_dataframe(bars: &[PriceBar]) -> PolarsResult<DataFrame> {
    let timestamp: Vec<&str> = bars.iter().map(|b| b.timestamp.as_str()).collect();
    let open: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volume: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Series::new(TIMESTAMP, timestamp),
        Series::new(OPEN, open),
        Series::new(HIGH, high),
        Series::new(LOW, low),
        Series::new(CLOSE, close),
        Series::new(VOLUME, volume),
    ])
}

fn full_window(window: usize) -> RollingOptions {
    RollingOptions {
        window_size: Duration::parse(&format!("{}i", window)),
        min_periods: window,
        ..Default::default()
    }
}

/// Append the technical indicators to a raw table and drop every row where
/// any numeric column is undefined.
///
/// A table shorter than the longest window comes back empty, with the full
/// set of columns.
pub fn derive_features(df: DataFrame, config: &FeatureConfig) -> PolarsResult<DataFrame> {
    let rows = df.height();
    if rows < config.min_rows() {
        debug!("Only {} rows, need {} to derive features", rows, config.min_rows());
        return empty_feature_table(&df);
    }

    let defined = BASE_FEATURES
        .iter()
        .chain(DERIVED_FEATURES.iter())
        .map(|name| col(name).is_not_nan())
        .reduce(|acc, expr| acc.and(expr))
        .unwrap_or_else(|| lit(true));

    let features = df
        .lazy()
        .with_columns([
            col(CLOSE)
                .rolling_mean(full_window(config.sma_short_window))
                .alias(SMA_SHORT),
            col(CLOSE)
                .rolling_mean(full_window(config.sma_long_window))
                .alias(SMA_LONG),
            col(CLOSE).pct_change(lit(1)).alias(PRICE_MOMENTUM),
            col(VOLUME).pct_change(lit(1)).alias(VOLUME_MOMENTUM),
            col(CLOSE)
                .rolling_std(full_window(config.volatility_window))
                .alias(VOLATILITY),
        ])
        // warm-up rows are null, 0/0 changes are NaN
        .drop_nulls(None)
        .filter(defined)
        .collect()?;

    debug!("Derived features for {} of {} rows", features.height(), rows);
    Ok(features)
}

fn empty_feature_table(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut empty = df.head(Some(0));
    for name in DERIVED_FEATURES {
        empty.with_column(Series::new_empty(name, &DataType::Float64))?;
    }
    Ok(empty)
}

/// Values of a float column. Nulls read as NaN.
pub fn column_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    Ok(df
        .column(name)?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}
