use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_PREFIX: &str = "ALPHA_VANTAGE";
const CONFIG_FILE: &str = "alpha_vantage";

/// Settings for the market-data provider. Passed explicitly to the fetcher.
#[derive(Debug, Clone, Deserialize)]
pub struct AlphaVantageConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AlphaVantageConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Loads `.env` if present, then layers defaults, an optional
    /// `alpha_vantage.toml` and `ALPHA_VANTAGE_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("api_key", "")?
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env.try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
