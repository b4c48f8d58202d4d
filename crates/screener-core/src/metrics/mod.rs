//! Metric calculators for the screening pipeline
//!
//! Each calculator is a pure function from one or two raw API payloads to an
//! optional metrics record. `None` means "insufficient data", never an
//! error: a sparse or missing payload degrades to a placeholder section in
//! the report instead of failing the run.

pub mod eps;
pub mod estimates;
pub mod margin;
pub mod pe;
pub mod price;
pub mod revenue;

pub use eps::{BeatMiss, EpsStats};
pub use estimates::{EstimateHorizon, EstimatesStats};
pub use margin::MarginStats;
pub use pe::PeStats;
pub use price::PriceStats;
pub use revenue::RevenueStats;

use crate::api::{Earnings, EarningsEstimates, IncomeStatement, MonthlyAdjusted};
use serde::Serialize;

/// The possibly-partial payload set fetched for one ticker
///
/// This is the core's only contract with the fetch layer: any payload may
/// be absent and every calculator downstream of it degrades to `None`.
#[derive(Debug, Clone, Default)]
pub struct ScreeningData {
    pub price_monthly: Option<MonthlyAdjusted>,
    pub earnings: Option<Earnings>,
    pub earnings_estimates: Option<EarningsEstimates>,
    pub income: Option<IncomeStatement>,
}

/// All metric records computed for one ticker
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickerReport {
    pub price: Option<PriceStats>,
    pub eps: Option<EpsStats>,
    pub revenue: Option<RevenueStats>,
    pub margin: Option<MarginStats>,
    pub pe: Option<PeStats>,
    pub estimates: Option<EstimatesStats>,
}

/// Run every calculator over one ticker's payload set
///
/// `current_year` is the calendar year used for the YTD figures; it is
/// injected by the caller so the pipeline stays deterministic under test.
/// `years` caps the annual trend window (margin and revenue share the income
/// payload, and P/E derives from the price and EPS records, so no extra
/// fetches happen here).
pub fn screen_ticker(data: &ScreeningData, current_year: i32, years: usize) -> TickerReport {
    let price = data.price_monthly.as_ref().and_then(|p| price::price_stats(p, years));
    let eps = data.earnings.as_ref().and_then(|e| eps::eps_stats(e, years));
    let revenue = data
        .income
        .as_ref()
        .and_then(|i| revenue::revenue_stats(i, years, current_year));
    let margin = data
        .income
        .as_ref()
        .and_then(|i| margin::margin_stats(i, years, current_year));
    let pe = pe::pe_stats(price.as_ref(), eps.as_ref());
    let estimates =
        estimates::estimates_stats(data.earnings_estimates.as_ref(), data.earnings.as_ref());

    TickerReport {
        price,
        eps,
        revenue,
        margin,
        pe,
        estimates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_ticker_tolerates_empty_payload_set() {
        let report = screen_ticker(&ScreeningData::default(), 2025, 5);
        assert!(report.price.is_none());
        assert!(report.eps.is_none());
        assert!(report.revenue.is_none());
        assert!(report.margin.is_none());
        assert!(report.pe.is_none());
        assert!(report.estimates.is_none());
    }
}
