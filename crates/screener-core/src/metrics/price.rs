//! Price trend statistics from the monthly adjusted series

use crate::api::MonthlyAdjusted;
use crate::stats::{self, RecentDelta};
use serde::Serialize;
use std::collections::BTreeMap;

/// Price trend metrics record
#[derive(Debug, Clone, Serialize)]
pub struct PriceStats {
    pub current: f64,
    pub current_date: String,
    pub mean_5yr: Option<f64>,
    pub cagr_5yr: Option<f64>,
    pub cv: Option<f64>,
    pub slope: Option<f64>,
    pub vs_3mo_pct: Option<f64>,
    pub vs_yoy_pct: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    pub vs_52w_high_pct: Option<f64>,
    pub vs_52w_low_pct: Option<f64>,
    pub months_of_data: usize,
    /// Fiscal-year-end proxy series, oldest first, capped at the trend window
    pub annual_years: Vec<String>,
    pub annual_values: Vec<f64>,
    pub annual_recent_delta: RecentDelta,
    pub annual_outliers: Vec<String>,
}

/// Compute price trend statistics from monthly adjusted data
///
/// Requires at least two parseable monthly closes; the window is capped at
/// `years * 12` months. The annual proxy is each year's December close,
/// with the most recent observation standing in for the current year when
/// its December has not printed yet.
pub fn price_stats(payload: &MonthlyAdjusted, years: usize) -> Option<PriceStats> {
    let mut monthly: Vec<(String, f64)> = payload
        .series
        .iter()
        .filter_map(|(date, bar)| {
            stats::safe_f64(bar.adjusted_close.as_deref()).map(|close| (date.clone(), close))
        })
        .collect();

    // Newest first; the map's iteration order is no ordering guarantee
    monthly.sort_by(|a, b| b.0.cmp(&a.0));

    if monthly.len() < 2 {
        return None;
    }
    monthly.truncate(years * 12);

    let closes: Vec<f64> = monthly.iter().map(|(_, c)| *c).collect();
    let current = closes[0];
    let current_date = monthly[0].0.clone();

    // 3-month change
    let vs_3mo_pct = (closes.len() > 3 && closes[3] != 0.0)
        .then(|| stats::round2((current - closes[3]) / closes[3] * 100.0));

    // YoY change
    let vs_yoy_pct = (closes.len() > 12 && closes[12] != 0.0)
        .then(|| stats::round2((current - closes[12]) / closes[12] * 100.0));

    // 52-week high/low from the last 12 monthly observations
    let last_12 = &closes[..closes.len().min(12)];
    let high_52w = last_12.iter().copied().reduce(f64::max);
    let low_52w = last_12.iter().copied().reduce(f64::min);
    let vs_52w_high_pct = high_52w
        .filter(|h| *h != 0.0)
        .map(|h| stats::round2((current - h) / h * 100.0));
    let vs_52w_low_pct = low_52w
        .filter(|l| *l != 0.0)
        .map(|l| stats::round2((current - l) / l * 100.0));

    // Chronological order for the trend statistics
    let closes_chrono: Vec<Option<f64>> =
        closes.iter().rev().copied().map(Some).collect();

    // Annual prices: December close as fiscal year-end proxy
    let mut annual_prices: BTreeMap<String, f64> = BTreeMap::new();
    for (date, close) in monthly.iter().rev() {
        if date.get(5..7) == Some("12") {
            if let Some(year) = date.get(..4) {
                annual_prices.insert(year.to_string(), *close);
            }
        }
    }

    // The most recent close stands in for the current year until December
    if let Some(current_year) = current_date.get(..4) {
        annual_prices
            .entry(current_year.to_string())
            .or_insert(current);
    }

    let skip = annual_prices.len().saturating_sub(years);
    let annual_years: Vec<String> = annual_prices.keys().skip(skip).cloned().collect();
    let annual_values: Vec<f64> = annual_prices.values().skip(skip).copied().collect();

    let annual_opt = stats::present(&annual_values);
    let annual_outliers = stats::outliers(&annual_opt)
        .into_iter()
        .map(|i| annual_years[i].clone())
        .collect();

    Some(PriceStats {
        current,
        current_date,
        mean_5yr: stats::mean(&closes_chrono),
        cagr_5yr: stats::cagr(&closes_chrono),
        cv: stats::coefficient_of_variation(&closes_chrono),
        slope: stats::slope(&closes_chrono),
        vs_3mo_pct,
        vs_yoy_pct,
        high_52w,
        low_52w,
        vs_52w_high_pct,
        vs_52w_low_pct,
        months_of_data: closes.len(),
        annual_years,
        annual_values,
        annual_recent_delta: stats::recent_delta(&annual_opt),
        annual_outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MonthlyBar;

    fn payload(entries: &[(&str, &str)]) -> MonthlyAdjusted {
        let mut data = MonthlyAdjusted::default();
        for (date, close) in entries {
            data.series.insert(
                (*date).to_string(),
                MonthlyBar {
                    adjusted_close: Some((*close).to_string()),
                },
            );
        }
        data
    }

    #[test]
    fn test_insufficient_observations() {
        assert!(price_stats(&MonthlyAdjusted::default(), 5).is_none());
        assert!(price_stats(&payload(&[("2025-07-31", "100.0")]), 5).is_none());
        // unparseable closes do not count as observations
        let sparse = payload(&[("2025-07-31", "100.0"), ("2025-06-30", "None")]);
        assert!(price_stats(&sparse, 5).is_none());
    }

    #[test]
    fn test_thirteen_month_window_indices() {
        // 13 closes newest-first: YoY compares against index 12, while the
        // 52-week band only covers indices 0-11.
        let entries = [
            ("2025-07-31", "110"), // index 0, current
            ("2025-06-30", "108"),
            ("2025-05-31", "104"),
            ("2025-04-30", "102"),
            ("2025-03-31", "101"),
            ("2025-02-28", "120"), // 52w high
            ("2025-01-31", "103"),
            ("2024-12-31", "105"),
            ("2024-11-30", "90"), // 52w low
            ("2024-10-31", "99"),
            ("2024-09-30", "98"),
            ("2024-08-31", "97"),
            ("2024-07-31", "50"), // index 12, outside the 52w band
        ];
        let result = price_stats(&payload(&entries), 5).unwrap();

        assert_eq!(result.current, 110.0);
        assert_eq!(result.current_date, "2025-07-31");
        assert_eq!(result.months_of_data, 13);
        assert_eq!(result.vs_yoy_pct, Some(120.0)); // (110 - 50) / 50
        assert_eq!(result.vs_3mo_pct, Some(7.84)); // (110 - 102) / 102
        assert_eq!(result.high_52w, Some(120.0));
        assert_eq!(result.low_52w, Some(90.0));
        assert_eq!(result.vs_52w_high_pct, Some(-8.33));
        assert_eq!(result.vs_52w_low_pct, Some(22.22));
    }

    #[test]
    fn test_annual_proxy_uses_december_and_current_standin() {
        let entries = [
            ("2025-07-31", "110"),
            ("2025-01-31", "103"),
            ("2024-12-31", "105"),
            ("2024-06-30", "95"),
            ("2023-12-31", "80"),
        ];
        let result = price_stats(&payload(&entries), 5).unwrap();

        // December closes for 2023/2024, current close stands in for 2025
        assert_eq!(result.annual_years, vec!["2023", "2024", "2025"]);
        assert_eq!(result.annual_values, vec![80.0, 105.0, 110.0]);
        assert_eq!(result.annual_recent_delta.absolute, Some(5.0));
        assert_eq!(result.annual_recent_delta.percent, Some(4.76));
    }

    #[test]
    fn test_annual_years_capped_to_window() {
        let entries = [
            ("2025-07-31", "110"),
            ("2024-12-31", "105"),
            ("2023-12-31", "100"),
            ("2022-12-31", "95"),
        ];
        let result = price_stats(&payload(&entries), 2).unwrap();
        assert_eq!(result.annual_years, vec!["2024", "2025"]);
        assert_eq!(result.annual_values, vec![105.0, 110.0]);
    }
}
