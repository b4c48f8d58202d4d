//! Operating margin trend statistics from the income statement payload
//!
//! Margins are computed independently per period (operating income over
//! total revenue) rather than aggregated from already-rounded margins, so
//! rounding error never compounds across periods.

use crate::api::{IncomeReport, IncomeStatement};
use crate::stats::{self, RecentDelta};
use serde::Serialize;

/// Operating margin trend metrics record
///
/// The YoY and prev-quarter deltas are absolute percentage points, not
/// relative percents.
#[derive(Debug, Clone, Serialize)]
pub struct MarginStats {
    pub latest: f64,
    pub latest_year: Option<String>,
    pub vs_yoy_pct: Option<f64>,
    pub vs_prev_q_pct: Option<f64>,
    pub mean_5yr: Option<f64>,
    pub cagr_5yr: Option<f64>,
    pub cv: Option<f64>,
    pub slope: Option<f64>,
    pub recent_delta: RecentDelta,
    pub outlier_years: Vec<String>,
    pub annual_years: Vec<String>,
    pub annual_values: Vec<f64>,
    pub years_of_data: usize,
    pub ytd_margin: Option<f64>,
    pub ytd_num_quarters: usize,
}

fn period_margin(report: &IncomeReport) -> Option<f64> {
    stats::pct(
        stats::safe_f64(report.operating_income.as_deref()),
        stats::safe_f64(report.total_revenue.as_deref()),
    )
}

/// Compute operating margin trend statistics
///
/// Requires at least two annual periods where both operating income and
/// revenue parse. `current_year` selects the quarters folded into the YTD
/// margin.
pub fn margin_stats(
    payload: &IncomeStatement,
    years: usize,
    current_year: i32,
) -> Option<MarginStats> {
    if payload.annual_reports.is_empty() {
        return None;
    }

    let mut annual_values = Vec::new();
    let mut annual_years = Vec::new();
    for report in payload.annual_reports.iter().take(years) {
        let margin = period_margin(report);
        let year = report.fiscal_date_ending.get(..4).unwrap_or("");
        if let Some(margin) = margin {
            if !year.is_empty() {
                annual_values.push(margin);
                annual_years.push(year.to_string());
            }
        }
    }
    annual_values.reverse();
    annual_years.reverse();

    if annual_values.len() < 2 {
        return None;
    }

    let latest = annual_values[annual_values.len() - 1];
    let prior = annual_values[annual_values.len() - 2];
    let vs_yoy_pct = Some(stats::round2(latest - prior));

    // Previous quarter comparison, in percentage points
    let quarterly = &payload.quarterly_reports;
    let vs_prev_q_pct = if quarterly.len() >= 2 {
        match (period_margin(&quarterly[0]), period_margin(&quarterly[1])) {
            (Some(lq), Some(pq)) => Some(stats::round2(lq - pq)),
            _ => None,
        }
    } else {
        None
    };

    // YTD margin from summed current-year income and revenue
    let year_prefix = current_year.to_string();
    let ytd_quarters: Vec<_> = quarterly
        .iter()
        .filter(|r| r.fiscal_date_ending.starts_with(&year_prefix))
        .collect();
    let ytd_num_quarters = ytd_quarters.len();
    let ytd_margin = if ytd_num_quarters > 0 {
        let ytd_oi: f64 = ytd_quarters
            .iter()
            .map(|r| stats::safe_f64(r.operating_income.as_deref()).unwrap_or(0.0))
            .sum();
        let ytd_rev: f64 = ytd_quarters
            .iter()
            .map(|r| stats::safe_f64(r.total_revenue.as_deref()).unwrap_or(0.0))
            .sum();
        stats::pct(Some(ytd_oi), Some(ytd_rev))
    } else {
        None
    };

    let annual_opt = stats::present(&annual_values);
    let outlier_years = stats::outliers(&annual_opt)
        .into_iter()
        .map(|i| annual_years[i].clone())
        .collect();

    Some(MarginStats {
        latest,
        latest_year: annual_years.last().cloned(),
        vs_yoy_pct,
        vs_prev_q_pct,
        mean_5yr: stats::mean(&annual_opt),
        cagr_5yr: stats::cagr(&annual_opt),
        cv: stats::coefficient_of_variation(&annual_opt),
        slope: stats::slope(&annual_opt),
        recent_delta: stats::recent_delta(&annual_opt),
        outlier_years,
        years_of_data: annual_values.len(),
        annual_years,
        annual_values,
        ytd_margin,
        ytd_num_quarters,
    })
}
