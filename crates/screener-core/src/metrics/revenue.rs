//! Revenue trend statistics from the income statement payload

use crate::api::IncomeStatement;
use crate::stats::{self, RecentDelta};
use serde::Serialize;

/// Revenue trend metrics record
#[derive(Debug, Clone, Serialize)]
pub struct RevenueStats {
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
    /// Current-year quarter sum scaled to a full-year-equivalent figure
    pub ytd_annualized: Option<f64>,
    pub ytd_num_quarters: usize,
    pub quarterly_latest: Option<f64>,
    pub quarterly_latest_date: Option<String>,
}

/// Compute revenue trend statistics
///
/// Requires at least two parseable annual revenue figures. `current_year`
/// selects the quarters folded into the YTD annualization.
pub fn revenue_stats(
    payload: &IncomeStatement,
    years: usize,
    current_year: i32,
) -> Option<RevenueStats> {
    if payload.annual_reports.is_empty() {
        return None;
    }

    // Annual revenue, newest-first in the source, reversed to chronological
    let mut annual_values = Vec::new();
    let mut annual_years = Vec::new();
    for report in payload.annual_reports.iter().take(years) {
        let revenue = stats::safe_f64(report.total_revenue.as_deref());
        let year = report.fiscal_date_ending.get(..4).unwrap_or("");
        if let Some(revenue) = revenue {
            if !year.is_empty() {
                annual_values.push(revenue);
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
    let vs_yoy_pct =
        (prior != 0.0).then(|| stats::round2((latest - prior) / prior.abs() * 100.0));

    // Previous quarter comparison
    let quarterly = &payload.quarterly_reports;
    let vs_prev_q_pct = if quarterly.len() >= 2 {
        let q_latest = stats::safe_f64(quarterly[0].total_revenue.as_deref());
        let q_prev = stats::safe_f64(quarterly[1].total_revenue.as_deref());
        match (q_latest, q_prev) {
            (Some(lq), Some(pq)) if lq != 0.0 && pq != 0.0 => {
                Some(stats::round2((lq - pq) / pq.abs() * 100.0))
            }
            _ => None,
        }
    } else {
        None
    };

    // YTD annualized: current-year quarters scaled to four
    let year_prefix = current_year.to_string();
    let ytd_quarters: Vec<_> = quarterly
        .iter()
        .filter(|r| r.fiscal_date_ending.starts_with(&year_prefix))
        .collect();
    let ytd_num_quarters = ytd_quarters.len();
    let ytd_annualized = (ytd_num_quarters > 0).then(|| {
        let ytd_sum: f64 = ytd_quarters
            .iter()
            .map(|r| stats::safe_f64(r.total_revenue.as_deref()).unwrap_or(0.0))
            .sum();
        ytd_sum * (4.0 / ytd_num_quarters as f64)
    });

    let annual_opt = stats::present(&annual_values);
    let outlier_years = stats::outliers(&annual_opt)
        .into_iter()
        .map(|i| annual_years[i].clone())
        .collect();

    Some(RevenueStats {
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
        ytd_annualized,
        ytd_num_quarters,
        quarterly_latest: quarterly
            .first()
            .and_then(|r| stats::safe_f64(r.total_revenue.as_deref())),
        quarterly_latest_date: quarterly.first().map(|r| r.fiscal_date_ending.clone()),
    })
}
