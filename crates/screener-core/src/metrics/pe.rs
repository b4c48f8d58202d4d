//! P/E trend statistics derived from the price and EPS records
//!
//! No extra API call: trailing P/E comes from the current price over TTM
//! EPS, and the historical series joins the two annual proxy series on year
//! label. P/E is undefined for non-positive earnings, so such years are
//! dropped from the join.

use crate::metrics::{EpsStats, PriceStats};
use crate::stats::{self, RecentDelta};
use serde::Serialize;
use std::collections::BTreeMap;

/// P/E trend metrics record
#[derive(Debug, Clone, Serialize)]
pub struct PeStats {
    pub trailing_pe: Option<f64>,
    pub current_price: f64,
    pub ttm_eps: Option<f64>,
    pub mean_5yr: Option<f64>,
    pub cagr_5yr: Option<f64>,
    pub cv: Option<f64>,
    pub slope: Option<f64>,
    pub vs_yoy_pct: Option<f64>,
    pub vs_5yr_avg_pct: Option<f64>,
    pub recent_delta: RecentDelta,
    pub outlier_years: Vec<String>,
    pub annual_years: Vec<String>,
    pub annual_values: Vec<f64>,
    pub years_of_data: usize,
}

/// Compute P/E trend statistics from already-computed price and EPS records
///
/// Absent when either input record is absent; the historical series may
/// still come out empty (no common years with positive EPS), which the
/// report renders as its placeholder.
pub fn pe_stats(price: Option<&PriceStats>, eps: Option<&EpsStats>) -> Option<PeStats> {
    let price = price?;
    let eps = eps?;

    // Current trailing P/E
    let trailing_pe = eps
        .ttm
        .filter(|ttm| *ttm > 0.0 && price.current != 0.0)
        .map(|ttm| stats::round2(price.current / ttm));

    // Historical annual P/E: year-end price over that year's EPS, inner
    // join on year label
    let price_annual: BTreeMap<&str, f64> = price
        .annual_years
        .iter()
        .map(String::as_str)
        .zip(price.annual_values.iter().copied())
        .collect();
    let eps_annual: BTreeMap<&str, f64> = eps
        .annual_years
        .iter()
        .map(String::as_str)
        .zip(eps.annual_values.iter().copied())
        .collect();

    let mut annual_years = Vec::new();
    let mut annual_values = Vec::new();
    for (year, year_price) in &price_annual {
        if let Some(year_eps) = eps_annual.get(year) {
            if *year_eps > 0.0 {
                annual_years.push((*year).to_string());
                annual_values.push(stats::round2(year_price / year_eps));
            }
        }
    }

    let annual_opt = stats::present(&annual_values);
    let mean_5yr = stats::mean(&annual_opt);

    // Current vs 5yr average
    let vs_5yr_avg_pct = match (trailing_pe, mean_5yr) {
        (Some(t), Some(m)) if t != 0.0 && m != 0.0 => {
            Some(stats::round2((t - m) / m * 100.0))
        }
        _ => None,
    };

    // YoY P/E change
    let vs_yoy_pct = if annual_values.len() >= 2 {
        let (last, prev) = (
            annual_values[annual_values.len() - 1],
            annual_values[annual_values.len() - 2],
        );
        (prev != 0.0).then(|| stats::round2((last - prev) / prev * 100.0))
    } else {
        None
    };

    let outlier_years = stats::outliers(&annual_opt)
        .into_iter()
        .map(|i| annual_years[i].clone())
        .collect();

    Some(PeStats {
        trailing_pe,
        current_price: price.current,
        ttm_eps: eps.ttm,
        mean_5yr,
        cagr_5yr: stats::cagr(&annual_opt),
        cv: stats::coefficient_of_variation(&annual_opt),
        slope: stats::slope(&annual_opt),
        vs_yoy_pct,
        vs_5yr_avg_pct,
        recent_delta: stats::recent_delta(&annual_opt),
        outlier_years,
        years_of_data: annual_values.len(),
        annual_years,
        annual_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnnualEarning, Earnings, MonthlyAdjusted, MonthlyBar, QuarterlyEarning};
    use crate::metrics::{eps, price};

    fn price_record(years: &[(&str, f64)], current: f64) -> PriceStats {
        let mut payload = MonthlyAdjusted::default();
        // seed two observations so the calculator accepts the payload, then
        // overwrite the annual proxy below
        payload.series.insert(
            "2025-07-31".to_string(),
            MonthlyBar {
                adjusted_close: Some(current.to_string()),
            },
        );
        payload.series.insert(
            "2025-06-30".to_string(),
            MonthlyBar {
                adjusted_close: Some(current.to_string()),
            },
        );
        let mut record = price::price_stats(&payload, 5).unwrap();
        record.annual_years = years.iter().map(|(y, _)| (*y).to_string()).collect();
        record.annual_values = years.iter().map(|(_, v)| *v).collect();
        record
    }

    fn eps_record(years: &[(&str, f64)], ttm: Option<f64>) -> EpsStats {
        let payload = Earnings {
            annual_earnings: years
                .iter()
                .rev()
                .map(|(y, v)| AnnualEarning {
                    fiscal_date_ending: format!("{y}-12-31"),
                    reported_eps: Some(v.to_string()),
                })
                .collect(),
            quarterly_earnings: vec![
                QuarterlyEarning {
                    fiscal_date_ending: "2025-06-30".to_string(),
                    reported_eps: Some("1.0".to_string()),
                    estimated_eps: None,
                },
                QuarterlyEarning {
                    fiscal_date_ending: "2025-03-31".to_string(),
                    reported_eps: Some("1.0".to_string()),
                    estimated_eps: None,
                },
            ],
        };
        let mut record = eps::eps_stats(&payload, 5).unwrap();
        record.ttm = ttm;
        record
    }

    #[test]
    fn test_absent_without_both_inputs() {
        let price = price_record(&[("2024", 100.0)], 100.0);
        let eps = eps_record(&[("2024", 5.0)], Some(5.0));

        assert!(pe_stats(None, None).is_none());
        assert!(pe_stats(Some(&price), None).is_none());
        assert!(pe_stats(None, Some(&eps)).is_none());
    }

    #[test]
    fn test_inner_join_excludes_non_positive_eps() {
        // price {2021: 150, 2022: 130} x EPS {2021: 5, 2022: -1}
        // => series [(2021, 30.0)] only
        let price = price_record(&[("2021", 150.0), ("2022", 130.0)], 130.0);
        let eps = eps_record(&[("2021", 5.0), ("2022", -1.0)], None);

        let result = pe_stats(Some(&price), Some(&eps)).unwrap();
        assert_eq!(result.annual_years, vec!["2021"]);
        assert_eq!(result.annual_values, vec![30.0]);
        assert_eq!(result.years_of_data, 1);
    }

    #[test]
    fn test_join_only_covers_common_years() {
        let price = price_record(&[("2022", 100.0), ("2023", 110.0), ("2024", 120.0)], 120.0);
        let eps = eps_record(&[("2023", 5.0), ("2024", 6.0)], None);

        let result = pe_stats(Some(&price), Some(&eps)).unwrap();
        assert_eq!(result.annual_years, vec!["2023", "2024"]);
        assert_eq!(result.annual_values, vec![22.0, 20.0]);
        // (20 - 22) / 22
        assert_eq!(result.vs_yoy_pct, Some(-9.09));
    }

    #[test]
    fn test_trailing_pe_requires_positive_ttm() {
        let price = price_record(&[("2024", 120.0)], 120.0);

        let result = pe_stats(Some(&price), Some(&eps_record(&[("2024", 6.0)], Some(6.0))))
            .unwrap();
        assert_eq!(result.trailing_pe, Some(20.0));

        let result = pe_stats(Some(&price), Some(&eps_record(&[("2024", 6.0)], Some(-2.0))))
            .unwrap();
        assert_eq!(result.trailing_pe, None);

        let result =
            pe_stats(Some(&price), Some(&eps_record(&[("2024", 6.0)], None))).unwrap();
        assert_eq!(result.trailing_pe, None);
    }

    #[test]
    fn test_vs_5yr_avg() {
        let price = price_record(&[("2023", 110.0), ("2024", 120.0)], 120.0);
        let eps = eps_record(&[("2023", 5.0), ("2024", 6.0)], Some(6.0));

        let result = pe_stats(Some(&price), Some(&eps)).unwrap();
        // annual P/E: 22.0 and 20.0, mean 21.0, trailing 20.0
        assert_eq!(result.trailing_pe, Some(20.0));
        assert_eq!(result.mean_5yr, Some(21.0));
        assert_eq!(result.vs_5yr_avg_pct, Some(-4.76));
    }
}
