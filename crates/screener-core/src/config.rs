//! Configuration for screening runs

use crate::error::{Result, ScreenError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Alpha Vantage API key
    pub alpha_vantage_api_key: Option<String>,

    /// Maximum API requests per minute (free tier: 5)
    pub rate_limit_per_minute: u32,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Number of annual periods kept for trend statistics
    pub years_to_analyze: usize,

    /// Maximum number of tickers screened per run
    pub max_tickers: usize,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            rate_limit_per_minute: 5,
            request_timeout: Duration::from_secs(30),
            years_to_analyze: 5,
            max_tickers: 5,
        }
    }
}

impl ScreenerConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScreenerConfigBuilder {
        ScreenerConfigBuilder::default()
    }

    /// Load the Alpha Vantage API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_per_minute == 0 {
            return Err(ScreenError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.years_to_analyze < 2 {
            return Err(ScreenError::ConfigError(
                "years_to_analyze must be at least 2".to_string(),
            ));
        }

        if self.max_tickers == 0 {
            return Err(ScreenError::ConfigError(
                "max_tickers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the API key, erroring if it was never provided
    pub fn require_api_key(&self) -> Result<&str> {
        self.alpha_vantage_api_key.as_deref().ok_or_else(|| {
            ScreenError::ConfigError(
                "ALPHA_VANTAGE_API_KEY environment variable not set".to_string(),
            )
        })
    }
}

/// Builder for ScreenerConfig
#[derive(Debug, Default)]
pub struct ScreenerConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    rate_limit_per_minute: Option<u32>,
    request_timeout: Option<Duration>,
    years_to_analyze: Option<usize>,
    max_tickers: Option<usize>,
}

impl ScreenerConfigBuilder {
    /// Set the Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Load the Alpha Vantage API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Set the per-minute request budget
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the number of annual periods analyzed
    pub fn years_to_analyze(mut self, years: usize) -> Self {
        self.years_to_analyze = Some(years);
        self
    }

    /// Set the per-run ticker cap
    pub fn max_tickers(mut self, count: usize) -> Self {
        self.max_tickers = Some(count);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ScreenerConfig> {
        let defaults = ScreenerConfig::default();

        let config = ScreenerConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            years_to_analyze: self.years_to_analyze.unwrap_or(defaults.years_to_analyze),
            max_tickers: self.max_tickers.unwrap_or(defaults.max_tickers),
        };

        config.validate()?;
        Ok(config)
    }
}
