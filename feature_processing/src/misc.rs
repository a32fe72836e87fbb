use serde::{Deserialize, Serialize};

pub const TIMESTAMP: &str = "timestamp";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";

pub const SMA_SHORT: &str = "SMA_5";
pub const SMA_LONG: &str = "SMA_20";
pub const PRICE_MOMENTUM: &str = "price_momentum";
pub const VOLUME_MOMENTUM: &str = "volume_momentum";
pub const VOLATILITY: &str = "volatility";

/// Columns fed to the regression, in order.
pub const BASE_FEATURES: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

pub const DERIVED_FEATURES: [&str; 5] =
    [SMA_SHORT, SMA_LONG, PRICE_MOMENTUM, VOLUME_MOMENTUM, VOLATILITY];

/// Rolling window sizes used when deriving features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub sma_short_window: usize,
    pub sma_long_window: usize,
    pub volatility_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sma_short_window: 5,
            sma_long_window: 20,
            volatility_window: 5,
        }
    }
}

impl FeatureConfig {
    /// Rows needed before every derived column is defined. Percent change
    /// needs one prior row.
    pub fn min_rows(&self) -> usize {
        self.sma_short_window
            .max(self.sma_long_window)
            .max(self.volatility_window)
            .max(2)
    }
}
