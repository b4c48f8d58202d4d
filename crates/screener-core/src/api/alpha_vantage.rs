//! Alpha Vantage API client
//!
//! One method per endpoint the screening run needs (4 calls per ticker):
//! monthly adjusted prices, earnings, earnings estimates, income statement.
//! Numeric fields arrive as strings and may hold the literal `"None"`, so
//! every payload models them as `Option<String>` and leaves parsing to
//! `stats::safe_f64`.

use crate::error::{Result, ScreenError};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Monthly adjusted time series payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyAdjusted {
    /// Date string (`YYYY-MM-DD`) to monthly bar
    #[serde(rename = "Monthly Adjusted Time Series", default)]
    pub series: HashMap<String, MonthlyBar>,
}

/// One monthly observation; only the adjusted close is consumed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyBar {
    #[serde(rename = "5. adjusted close")]
    pub adjusted_close: Option<String>,
}

/// Earnings payload: annual and quarterly reported EPS
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Earnings {
    #[serde(rename = "annualEarnings", default)]
    pub annual_earnings: Vec<AnnualEarning>,
    #[serde(rename = "quarterlyEarnings", default)]
    pub quarterly_earnings: Vec<QuarterlyEarning>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnualEarning {
    #[serde(rename = "fiscalDateEnding", default)]
    pub fiscal_date_ending: String,
    #[serde(rename = "reportedEPS")]
    pub reported_eps: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuarterlyEarning {
    #[serde(rename = "fiscalDateEnding", default)]
    pub fiscal_date_ending: String,
    #[serde(rename = "reportedEPS")]
    pub reported_eps: Option<String>,
    #[serde(rename = "estimatedEPS")]
    pub estimated_eps: Option<String>,
}

/// Income statement payload: annual and quarterly reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    #[serde(rename = "annualReports", default)]
    pub annual_reports: Vec<IncomeReport>,
    #[serde(rename = "quarterlyReports", default)]
    pub quarterly_reports: Vec<IncomeReport>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeReport {
    #[serde(rename = "fiscalDateEnding", default)]
    pub fiscal_date_ending: String,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: Option<String>,
    #[serde(rename = "operatingIncome")]
    pub operating_income: Option<String>,
}

/// Earnings estimates payload: consensus per forecast horizon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsEstimates {
    #[serde(default)]
    pub estimates: Vec<EstimateEntry>,
}

/// One consensus entry; field names match the API's snake_case keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateEntry {
    pub date: Option<String>,
    pub horizon: Option<String>,
    pub eps_estimate_average: Option<String>,
    pub eps_estimate_high: Option<String>,
    pub eps_estimate_low: Option<String>,
    pub eps_estimate_analyst_count: Option<String>,
    pub eps_estimate_average_7_days_ago: Option<String>,
    pub eps_estimate_average_30_days_ago: Option<String>,
    pub eps_estimate_average_60_days_ago: Option<String>,
    pub eps_estimate_average_90_days_ago: Option<String>,
    pub eps_estimate_revision_up_trailing_7_days: Option<String>,
    pub eps_estimate_revision_down_trailing_7_days: Option<String>,
    pub eps_estimate_revision_up_trailing_30_days: Option<String>,
    pub eps_estimate_revision_down_trailing_30_days: Option<String>,
    pub revenue_estimate_average: Option<String>,
    pub revenue_estimate_high: Option<String>,
    pub revenue_estimate_low: Option<String>,
    pub revenue_estimate_analyst_count: Option<String>,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (default: 5 for free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        // Create rate limiter quota (requests per minute)
        let quota = Quota::per_minute(
            NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).expect("nonzero")),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create from a screening configuration (API key, rate limit, timeout)
    pub fn from_config(config: &crate::config::ScreenerConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute)
                .unwrap_or(NonZeroU32::new(5).expect("nonzero")),
        );

        Ok(Self {
            client,
            api_key,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Get the monthly adjusted price series
    pub async fn monthly_adjusted(&self, symbol: &str) -> Result<MonthlyAdjusted> {
        let data = self.query("TIME_SERIES_MONTHLY_ADJUSTED", symbol).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Get annual and quarterly earnings history
    pub async fn earnings(&self, symbol: &str) -> Result<Earnings> {
        let data = self.query("EARNINGS", symbol).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Get consensus earnings and revenue estimates
    pub async fn earnings_estimates(&self, symbol: &str) -> Result<EarningsEstimates> {
        let data = self.query("EARNINGS_ESTIMATES", symbol).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Get annual and quarterly income statements
    pub async fn income_statement(&self, symbol: &str) -> Result<IncomeStatement> {
        let data = self.query("INCOME_STATEMENT", symbol).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Issue one rate-limited query and screen the response for API errors
    async fn query(&self, function: &str, symbol: &str) -> Result<serde_json::Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        debug!(function, symbol, "querying Alpha Vantage");

        let mut params = HashMap::new();
        params.insert("function", function);
        params.insert("symbol", symbol);
        params.insert("apikey", &self.api_key);

        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(ScreenError::ApiError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;

        // Check for API error messages
        if let Some(error) = data.get("Error Message") {
            return Err(ScreenError::ApiError(error.to_string()));
        }

        // Free-tier throttling arrives as a "Note" or "Information" key
        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(ScreenError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string(),
            });
        }

        // An empty object means the symbol is unknown
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(ScreenError::InvalidSymbol(symbol.to_string()));
        }

        Ok(data)
    }
}
