//! Command-line interface for the fundamentals screener

use chrono::{Datelike, Local};
use clap::Parser;
use screener_core::{AlphaVantageClient, ScreenerConfig, ScreeningData, render_report};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "screener")]
#[command(about = "Fundamentals screening report generator", long_about = None)]
struct Args {
    /// Ticker symbols to screen (e.g. AAPL MSFT)
    #[arg(num_args = 1.., required = true)]
    tickers: Vec<String>,

    /// Output path for the Markdown report (default: screening_<date>.md)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Alpha Vantage requests per minute
    #[arg(long)]
    rate_limit: Option<u32>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut builder = ScreenerConfig::builder().with_env_api_key();
    if let Some(rate_limit) = args.rate_limit {
        builder = builder.rate_limit_per_minute(rate_limit);
    }
    let config = builder.build()?;
    config.require_api_key()?;

    let mut tickers: Vec<String> = args
        .tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tickers.len() > config.max_tickers {
        warn!(
            limit = config.max_tickers,
            requested = tickers.len(),
            "too many tickers requested, truncating"
        );
        tickers.truncate(config.max_tickers);
    }

    let client = AlphaVantageClient::from_config(&config)?;
    let current_year = Local::now().year();

    let mut results: HashMap<String, screener_core::TickerReport> = HashMap::new();
    for ticker in &tickers {
        info!(%ticker, "fetching fundamentals");
        let data = ScreeningData {
            price_monthly: fetch_or_warn(ticker, "monthly prices", client.monthly_adjusted(ticker)).await,
            earnings: fetch_or_warn(ticker, "earnings", client.earnings(ticker)).await,
            earnings_estimates: fetch_or_warn(
                ticker,
                "earnings estimates",
                client.earnings_estimates(ticker),
            )
            .await,
            income: fetch_or_warn(ticker, "income statement", client.income_statement(ticker))
                .await,
        };
        results.insert(
            ticker.clone(),
            screener_core::screen_ticker(&data, current_year, config.years_to_analyze),
        );
    }

    let date = Local::now().format("%Y-%m-%d").to_string();
    let report = render_report(&date, &tickers, &results);

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("screening_{date}.md")));
    std::fs::write(&path, &report)?;
    info!(path = %path.display(), "report written");

    Ok(())
}

/// Resolve a fetch future to `None` on failure so one bad endpoint never
/// sinks the whole ticker
async fn fetch_or_warn<T>(
    ticker: &str,
    endpoint: &str,
    fut: impl Future<Output = screener_core::Result<T>>,
) -> Option<T> {
    match fut.await {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!(%ticker, endpoint, %err, "fetch failed");
            None
        }
    }
}
