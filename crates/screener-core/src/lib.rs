//! Fundamentals screening library
//!
//! This crate turns raw Alpha Vantage payloads into a Markdown screening
//! report. It covers:
//!
//! - Data fetching from Alpha Vantage (monthly prices, earnings,
//!   earnings estimates, income statements) with client-side rate limiting
//! - Trend statistics (CAGR, coefficient of variation, OLS slope,
//!   recent deltas, outlier detection)
//! - Per-ticker metric records: price, EPS, revenue, operating margin,
//!   P/E, analyst estimates
//! - Markdown report rendering with graceful per-section degradation
//!
//! # Example
//!
//! ```rust,ignore
//! use screener_core::{AlphaVantageClient, ScreenerConfig, ScreeningData};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScreenerConfig::default().with_env_api_key();
//!     let client = AlphaVantageClient::from_config(&config)?;
//!
//!     let data = ScreeningData {
//!         price_monthly: client.monthly_adjusted("AAPL").await.ok(),
//!         earnings: client.earnings("AAPL").await.ok(),
//!         earnings_estimates: client.earnings_estimates("AAPL").await.ok(),
//!         income: client.income_statement("AAPL").await.ok(),
//!     };
//!
//!     let report = screener_core::screen_ticker(&data, 2025, 5);
//!     println!("{report:#?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod stats;

pub use api::AlphaVantageClient;
pub use config::ScreenerConfig;
pub use error::{Result, ScreenError};
pub use metrics::{ScreeningData, TickerReport, screen_ticker};
pub use report::render_report;
