//! EPS trend statistics from the earnings payload

use crate::api::Earnings;
use crate::stats::{self, RecentDelta};
use serde::Serialize;

/// One quarter of reported-vs-estimated EPS history
#[derive(Debug, Clone, Serialize)]
pub struct BeatMiss {
    pub date: String,
    pub reported: f64,
    pub estimated: f64,
    /// Reported minus estimated, at EPS granularity (4 dp)
    pub surprise: f64,
    pub surprise_pct: Option<f64>,
}

/// EPS trend metrics record
#[derive(Debug, Clone, Serialize)]
pub struct EpsStats {
    pub latest: f64,
    pub latest_date: String,
    /// Trailing twelve months: sum of the last 4 quarters, absent unless all
    /// four are present
    pub ttm: Option<f64>,
    pub vs_prev_q_pct: Option<f64>,
    pub vs_yoy_pct: Option<f64>,
    pub mean_5yr: Option<f64>,
    pub cagr_5yr: Option<f64>,
    pub cv: Option<f64>,
    pub slope: Option<f64>,
    pub recent_delta: RecentDelta,
    pub outlier_years: Vec<String>,
    pub annual_years: Vec<String>,
    pub annual_values: Vec<f64>,
    pub years_of_data: usize,
    pub beat_miss_history: Vec<BeatMiss>,
}

/// Compute EPS trend statistics
///
/// Requires at least two quarterly entries with a parseable latest EPS.
pub fn eps_stats(payload: &Earnings, years: usize) -> Option<EpsStats> {
    let quarterly = &payload.quarterly_earnings;
    if quarterly.len() < 2 {
        return None;
    }

    let latest = stats::safe_f64(quarterly[0].reported_eps.as_deref())?;
    let latest_date = quarterly[0].fiscal_date_ending.clone();

    // Previous quarter
    let vs_prev_q_pct = stats::safe_f64(quarterly[1].reported_eps.as_deref())
        .filter(|prev| *prev != 0.0)
        .map(|prev| stats::round2((latest - prev) / prev.abs() * 100.0));

    // Same quarter last year = 4 quarters ago
    let vs_yoy_pct = quarterly
        .get(4)
        .and_then(|q| stats::safe_f64(q.reported_eps.as_deref()))
        .filter(|yoy| *yoy != 0.0)
        .map(|yoy| stats::round2((latest - yoy) / yoy.abs() * 100.0));

    // TTM EPS: every one of the last 4 quarters must be present
    let ttm = if quarterly.len() >= 4 {
        quarterly[..4]
            .iter()
            .map(|q| stats::safe_f64(q.reported_eps.as_deref()))
            .sum::<Option<f64>>()
            .map(stats::round2)
    } else {
        None
    };

    // Annual series for the trend window, reversed to chronological
    let mut annual_values = Vec::new();
    let mut annual_years = Vec::new();
    for entry in payload.annual_earnings.iter().take(years) {
        let eps = stats::safe_f64(entry.reported_eps.as_deref());
        let year = entry.fiscal_date_ending.get(..4).unwrap_or("");
        if let Some(eps) = eps {
            if !year.is_empty() {
                annual_values.push(eps);
                annual_years.push(year.to_string());
            }
        }
    }
    annual_values.reverse();
    annual_years.reverse();

    // Beat/miss history over the last 4 quarters
    let beat_miss_history: Vec<BeatMiss> = quarterly
        .iter()
        .take(4)
        .filter_map(|q| {
            let reported = stats::safe_f64(q.reported_eps.as_deref())?;
            let estimated = stats::safe_f64(q.estimated_eps.as_deref())?;
            let surprise_pct = (estimated != 0.0)
                .then(|| stats::round2((reported - estimated) / estimated.abs() * 100.0));
            Some(BeatMiss {
                date: q.fiscal_date_ending.clone(),
                reported,
                estimated,
                surprise: stats::round4(reported - estimated),
                surprise_pct,
            })
        })
        .collect();

    let annual_opt = stats::present(&annual_values);
    let outlier_years = stats::outliers(&annual_opt)
        .into_iter()
        .map(|i| annual_years[i].clone())
        .collect();

    Some(EpsStats {
        latest,
        latest_date,
        ttm,
        vs_prev_q_pct,
        vs_yoy_pct,
        mean_5yr: stats::mean(&annual_opt),
        cagr_5yr: stats::cagr(&annual_opt),
        cv: stats::coefficient_of_variation(&annual_opt),
        slope: stats::slope(&annual_opt),
        recent_delta: stats::recent_delta(&annual_opt),
        outlier_years,
        years_of_data: annual_values.len(),
        annual_years,
        annual_values,
        beat_miss_history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnnualEarning, QuarterlyEarning};

    fn quarter(date: &str, reported: Option<&str>, estimated: Option<&str>) -> QuarterlyEarning {
        QuarterlyEarning {
            fiscal_date_ending: date.to_string(),
            reported_eps: reported.map(str::to_string),
            estimated_eps: estimated.map(str::to_string),
        }
    }

    fn annual(date: &str, reported: &str) -> AnnualEarning {
        AnnualEarning {
            fiscal_date_ending: date.to_string(),
            reported_eps: Some(reported.to_string()),
        }
    }

    fn sample() -> Earnings {
        Earnings {
            annual_earnings: vec![
                annual("2024-12-31", "6.00"),
                annual("2023-12-31", "5.00"),
                annual("2022-12-31", "4.50"),
            ],
            quarterly_earnings: vec![
                quarter("2025-06-30", Some("1.60"), Some("1.50")),
                quarter("2025-03-31", Some("1.40"), Some("1.45")),
                quarter("2024-12-31", Some("1.55"), Some("1.50")),
                quarter("2024-09-30", Some("1.45"), Some("1.40")),
                quarter("2024-06-30", Some("1.25"), Some("1.20")),
            ],
        }
    }

    #[test]
    fn test_requires_two_quarters_and_parseable_latest() {
        assert!(eps_stats(&Earnings::default(), 5).is_none());

        let one_quarter = Earnings {
            quarterly_earnings: vec![quarter("2025-06-30", Some("1.60"), None)],
            ..Default::default()
        };
        assert!(eps_stats(&one_quarter, 5).is_none());

        let mut unparseable = sample();
        unparseable.quarterly_earnings[0].reported_eps = Some("None".to_string());
        assert!(eps_stats(&unparseable, 5).is_none());
    }

    #[test]
    fn test_quarterly_deltas_and_ttm() {
        let result = eps_stats(&sample(), 5).unwrap();

        assert_eq!(result.latest, 1.60);
        assert_eq!(result.latest_date, "2025-06-30");
        // (1.60 - 1.40) / 1.40
        assert_eq!(result.vs_prev_q_pct, Some(14.29));
        // vs 4 quarters ago: (1.60 - 1.25) / 1.25
        assert_eq!(result.vs_yoy_pct, Some(28.0));
        // 1.60 + 1.40 + 1.55 + 1.45
        assert_eq!(result.ttm, Some(6.0));
    }

    #[test]
    fn test_ttm_absent_when_any_quarter_missing() {
        let mut earnings = sample();
        earnings.quarterly_earnings[2].reported_eps = None;
        let result = eps_stats(&earnings, 5).unwrap();
        assert_eq!(result.ttm, None);
    }

    #[test]
    fn test_annual_series_is_chronological() {
        let result = eps_stats(&sample(), 5).unwrap();
        assert_eq!(result.annual_years, vec!["2022", "2023", "2024"]);
        assert_eq!(result.annual_values, vec![4.5, 5.0, 6.0]);
        assert_eq!(result.years_of_data, 3);
        // (6/4.5)^(1/2) - 1 = 15.47%
        assert_eq!(result.cagr_5yr, Some(15.47));
    }

    #[test]
    fn test_beat_miss_history() {
        let result = eps_stats(&sample(), 5).unwrap();
        assert_eq!(result.beat_miss_history.len(), 4);

        let latest = &result.beat_miss_history[0];
        assert_eq!(latest.surprise, 0.10);
        assert_eq!(latest.surprise_pct, Some(6.67));

        let miss = &result.beat_miss_history[1];
        assert_eq!(miss.surprise, -0.05);
        assert_eq!(miss.surprise_pct, Some(-3.45));
    }

    #[test]
    fn test_beat_miss_skips_quarters_without_estimates() {
        let mut earnings = sample();
        earnings.quarterly_earnings[1].estimated_eps = None;
        let result = eps_stats(&earnings, 5).unwrap();
        assert_eq!(result.beat_miss_history.len(), 3);
    }
}
