//! Consensus estimates summary from the earnings-estimates payload

use crate::api::{Earnings, EarningsEstimates, EstimateEntry};
use crate::stats;
use serde::Serialize;

/// One parsed forecast-horizon entry
#[derive(Debug, Clone, Default, Serialize)]
pub struct EstimateHorizon {
    pub date: Option<String>,
    pub horizon: Option<String>,
    pub eps_avg: Option<f64>,
    pub eps_high: Option<f64>,
    pub eps_low: Option<f64>,
    pub analyst_count: Option<f64>,
    pub revision_7d: Option<f64>,
    pub revision_30d: Option<f64>,
    pub revision_60d: Option<f64>,
    pub revision_90d: Option<f64>,
    pub rev_up_7d: Option<f64>,
    pub rev_down_7d: Option<f64>,
    pub rev_up_30d: Option<f64>,
    pub rev_down_30d: Option<f64>,
    pub revenue_avg: Option<f64>,
    pub revenue_high: Option<f64>,
    pub revenue_low: Option<f64>,
    pub revenue_analyst_count: Option<f64>,
}

/// Consensus estimates metrics record
#[derive(Debug, Clone, Serialize)]
pub struct EstimatesStats {
    pub latest_actual_eps: Option<f64>,
    pub next_quarter: Option<EstimateHorizon>,
    pub current_fiscal_year: Option<EstimateHorizon>,
    pub next_fiscal_year: Option<EstimateHorizon>,
    /// Latest actual EPS minus the next-quarter consensus (4 dp)
    pub delta_actual_vs_next_q: Option<f64>,
    pub delta_actual_vs_next_q_pct: Option<f64>,
    pub all_estimates: Vec<EstimateHorizon>,
}

fn parse_entry(entry: &EstimateEntry) -> EstimateHorizon {
    let f = |v: &Option<String>| stats::safe_f64(v.as_deref());
    EstimateHorizon {
        date: entry.date.clone(),
        horizon: entry.horizon.clone(),
        eps_avg: f(&entry.eps_estimate_average),
        eps_high: f(&entry.eps_estimate_high),
        eps_low: f(&entry.eps_estimate_low),
        analyst_count: f(&entry.eps_estimate_analyst_count),
        revision_7d: f(&entry.eps_estimate_average_7_days_ago),
        revision_30d: f(&entry.eps_estimate_average_30_days_ago),
        revision_60d: f(&entry.eps_estimate_average_60_days_ago),
        revision_90d: f(&entry.eps_estimate_average_90_days_ago),
        rev_up_7d: f(&entry.eps_estimate_revision_up_trailing_7_days),
        rev_down_7d: f(&entry.eps_estimate_revision_down_trailing_7_days),
        rev_up_30d: f(&entry.eps_estimate_revision_up_trailing_30_days),
        rev_down_30d: f(&entry.eps_estimate_revision_down_trailing_30_days),
        revenue_avg: f(&entry.revenue_estimate_average),
        revenue_high: f(&entry.revenue_estimate_high),
        revenue_low: f(&entry.revenue_estimate_low),
        revenue_analyst_count: f(&entry.revenue_estimate_analyst_count),
    }
}

/// Summarize consensus estimates across the three fixed forecast horizons
///
/// Horizon matching is a case-insensitive substring match; the first entry
/// matching each phrase wins and later duplicates are silently ignored.
/// The earnings payload, when present, supplies the latest actual EPS for
/// the consensus-delta figures.
pub fn estimates_stats(
    payload: Option<&EarningsEstimates>,
    earnings: Option<&Earnings>,
) -> Option<EstimatesStats> {
    let payload = payload?;
    if payload.estimates.is_empty() {
        return None;
    }

    let latest_actual_eps = earnings
        .and_then(|e| e.quarterly_earnings.first())
        .and_then(|q| stats::safe_f64(q.reported_eps.as_deref()));

    let all_estimates: Vec<EstimateHorizon> = payload.estimates.iter().map(parse_entry).collect();

    // First match per phrase wins
    let mut next_quarter: Option<EstimateHorizon> = None;
    let mut next_fiscal_year: Option<EstimateHorizon> = None;
    let mut current_fiscal_year: Option<EstimateHorizon> = None;
    for parsed in &all_estimates {
        let horizon = parsed
            .horizon
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if horizon.contains("next quarter") {
            if next_quarter.is_none() {
                next_quarter = Some(parsed.clone());
            }
        } else if horizon.contains("next fiscal year") {
            if next_fiscal_year.is_none() {
                next_fiscal_year = Some(parsed.clone());
            }
        } else if horizon.contains("current fiscal year") && current_fiscal_year.is_none() {
            current_fiscal_year = Some(parsed.clone());
        }
    }

    // Delta: latest actual EPS vs next quarter consensus
    let consensus = next_quarter
        .as_ref()
        .and_then(|nq| nq.eps_avg)
        .filter(|avg| *avg != 0.0);
    let (delta_actual_vs_next_q, delta_actual_vs_next_q_pct) =
        match (latest_actual_eps, consensus) {
            (Some(actual), Some(avg)) => (
                Some(stats::round4(actual - avg)),
                Some(stats::round2((actual - avg) / avg.abs() * 100.0)),
            ),
            _ => (None, None),
        };

    Some(EstimatesStats {
        latest_actual_eps,
        next_quarter,
        current_fiscal_year,
        next_fiscal_year,
        delta_actual_vs_next_q,
        delta_actual_vs_next_q_pct,
        all_estimates,
    })
}
