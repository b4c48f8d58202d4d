//! Markdown report assembly
//!
//! Deterministic single pass over the computed records: a fixed section
//! sequence per ticker, with every section independently degrading to a
//! placeholder line when its record is absent. Identical inputs always
//! produce byte-identical output.

pub mod format;

pub use format::{Unit, fmt_delta, fmt_val, markdown_table};

use crate::metrics::{
    EpsStats, EstimateHorizon, EstimatesStats, MarginStats, PeStats, PriceStats, RevenueStats,
    TickerReport,
};
use format::{ABSENT, join_or_none};
use std::collections::HashMap;

/// Render the full screening report for the requested tickers
///
/// Tickers render in caller order; a ticker with no result set at all gets
/// a `Data unavailable.` section.
pub fn render_report(
    date: &str,
    tickers: &[String],
    results: &HashMap<String, TickerReport>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("# Stock Screening — {date}"));
    lines.push(String::new());
    lines.push(format!("**Tickers:** {}", tickers.join(", ")));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    for ticker in tickers {
        lines.push(format!("## {ticker}"));
        lines.push(String::new());

        let Some(report) = results.get(ticker) else {
            lines.push("Data unavailable.".to_string());
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
            continue;
        };

        summary_section(&mut lines, report);
        price_section(&mut lines, report.price.as_ref());
        eps_section(&mut lines, report.eps.as_ref());
        revenue_section(&mut lines, report.revenue.as_ref());
        margin_section(&mut lines, report.margin.as_ref());
        pe_section(&mut lines, report.pe.as_ref());
        estimates_section(&mut lines, report.estimates.as_ref(), report.eps.as_ref());

        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Annual historical values row: year labels plus an optional current-value
/// column (`Current`, `TTM`, `Trailing`, `YTD ...`)
fn annual_table(
    label: &str,
    years: &[String],
    values: &[f64],
    unit: Unit,
    current: Option<(&str, f64)>,
) -> String {
    let mut headers: Vec<String> = vec![String::new()];
    headers.extend(years.iter().cloned());
    let mut row: Vec<String> = vec![label.to_string()];
    row.extend(values.iter().map(|v| fmt_val(Some(*v), unit)));

    if let Some((current_label, current_val)) = current {
        headers.push(current_label.to_string());
        row.push(fmt_val(Some(current_val), unit));
    }

    markdown_table(&headers, &[row])
}

fn summary_section(lines: &mut Vec<String>, report: &TickerReport) {
    lines.push("### Summary".to_string());
    lines.push(String::new());

    let headers: Vec<String> = ["Metric", "YoY", "3M / Prev Q", "5yr CAGR"]
        .iter()
        .map(ToString::to_string)
        .collect();

    let absent = || {
        vec![
            ABSENT.to_string(),
            ABSENT.to_string(),
            ABSENT.to_string(),
        ]
    };
    let mut rows: Vec<Vec<String>> = Vec::new();

    let mut push_row = |metric: &str, cells: Vec<String>| {
        let mut row = vec![metric.to_string()];
        row.extend(cells);
        rows.push(row);
    };

    push_row(
        "Price",
        report.price.as_ref().map_or_else(absent, |p| {
            vec![
                fmt_delta(p.vs_yoy_pct, Unit::Percent),
                fmt_delta(p.vs_3mo_pct, Unit::Percent),
                fmt_val(p.cagr_5yr, Unit::Percent),
            ]
        }),
    );
    push_row(
        "EPS",
        report.eps.as_ref().map_or_else(absent, |e| {
            vec![
                fmt_delta(e.vs_yoy_pct, Unit::Percent),
                fmt_delta(e.vs_prev_q_pct, Unit::Percent),
                fmt_val(e.cagr_5yr, Unit::Percent),
            ]
        }),
    );
    push_row(
        "Revenue",
        report.revenue.as_ref().map_or_else(absent, |r| {
            vec![
                fmt_delta(r.vs_yoy_pct, Unit::Percent),
                fmt_delta(r.vs_prev_q_pct, Unit::Percent),
                fmt_val(r.cagr_5yr, Unit::Percent),
            ]
        }),
    );
    push_row(
        "Op. Margin",
        report.margin.as_ref().map_or_else(absent, |m| {
            vec![
                fmt_delta(m.vs_yoy_pct, Unit::Percent),
                fmt_delta(m.vs_prev_q_pct, Unit::Percent),
                fmt_val(m.cagr_5yr, Unit::Percent),
            ]
        }),
    );

    lines.push(markdown_table(&headers, &rows));
    lines.push(String::new());

    // P/E summary line
    if let Some(pe) = &report.pe {
        let parts = [
            format!("Trailing {}", fmt_val(pe.trailing_pe, Unit::Ratio)),
            format!("YoY {}", fmt_delta(pe.vs_yoy_pct, Unit::Percent)),
            format!(
                "vs 5yr Avg ({}): {}",
                fmt_val(pe.mean_5yr, Unit::Ratio),
                fmt_delta(pe.vs_5yr_avg_pct, Unit::Percent)
            ),
        ];
        lines.push(format!("**P/E:** {}", parts.join(" | ")));
    } else {
        lines.push("**P/E:** —".to_string());
    }
    lines.push(String::new());

    // Estimates summary line
    let estimates_line = report
        .estimates
        .as_ref()
        .and_then(|est| {
            let nq = est.next_quarter.as_ref()?;
            let consensus = nq.eps_avg?;
            let mut parts = vec![
                format!(
                    "Latest actual EPS {}",
                    fmt_val(est.latest_actual_eps, Unit::Dollars)
                ),
                format!("Next Q consensus {}", fmt_val(Some(consensus), Unit::Dollars)),
                format!(
                    "Delta {}",
                    fmt_delta(est.delta_actual_vs_next_q_pct, Unit::Percent)
                ),
            ];
            if let Some(count) = nq.analyst_count.filter(|c| *c != 0.0) {
                parts.push(format!("{} analysts", count as i64));
            }
            Some(format!("**Estimates:** {}", parts.join(" | ")))
        })
        .unwrap_or_else(|| "**Estimates:** —".to_string());
    lines.push(estimates_line);
    lines.push(String::new());
}

fn price_section(lines: &mut Vec<String>, price: Option<&PriceStats>) {
    lines.push("### Price Trend".to_string());
    lines.push(String::new());
    match price.filter(|p| !p.annual_years.is_empty()) {
        Some(price) => {
            lines.push(annual_table(
                "Price",
                &price.annual_years,
                &price.annual_values,
                Unit::Dollars,
                Some(("Current", price.current)),
            ));
            lines.push(String::new());

            let headers: Vec<String> = [
                "Current", "5yr Mean", "5yr CAGR", "YoY", "3M", "CV", "Slope", "52w High",
                "52w Low", "Outliers",
            ]
            .iter()
            .map(ToString::to_string)
            .collect();
            let row = vec![
                fmt_val(Some(price.current), Unit::Dollars),
                fmt_val(price.mean_5yr, Unit::Dollars),
                fmt_val(price.cagr_5yr, Unit::Percent),
                fmt_delta(price.vs_yoy_pct, Unit::Percent),
                fmt_delta(price.vs_3mo_pct, Unit::Percent),
                fmt_val(price.cv, Unit::Percent),
                fmt_val(price.slope, Unit::Ratio),
                format!(
                    "{} ({})",
                    fmt_val(price.high_52w, Unit::Dollars),
                    fmt_delta(price.vs_52w_high_pct, Unit::Percent)
                ),
                format!(
                    "{} ({})",
                    fmt_val(price.low_52w, Unit::Dollars),
                    fmt_delta(price.vs_52w_low_pct, Unit::Percent)
                ),
                join_or_none(&price.annual_outliers),
            ];
            lines.push(markdown_table(&headers, &[row]));
        }
        None => lines.push("*No price data available*".to_string()),
    }
    lines.push(String::new());
}

fn eps_section(lines: &mut Vec<String>, eps: Option<&EpsStats>) {
    lines.push("### EPS Trend".to_string());
    lines.push(String::new());
    match eps.filter(|e| !e.annual_years.is_empty()) {
        Some(eps) => {
            lines.push(annual_table(
                "EPS",
                &eps.annual_years,
                &eps.annual_values,
                Unit::Dollars,
                eps.ttm.map(|ttm| ("TTM", ttm)),
            ));
            lines.push(String::new());

            let headers: Vec<String> = [
                "Latest Q", "5yr Mean", "5yr CAGR", "YoY", "Prev Q", "CV", "Slope", "Outliers",
            ]
            .iter()
            .map(ToString::to_string)
            .collect();
            let row = vec![
                fmt_val(Some(eps.latest), Unit::Dollars),
                fmt_val(eps.mean_5yr, Unit::Dollars),
                fmt_val(eps.cagr_5yr, Unit::Percent),
                fmt_delta(eps.vs_yoy_pct, Unit::Percent),
                fmt_delta(eps.vs_prev_q_pct, Unit::Percent),
                fmt_val(eps.cv, Unit::Percent),
                fmt_val(eps.slope, Unit::Ratio),
                join_or_none(&eps.outlier_years),
            ];
            lines.push(markdown_table(&headers, &[row]));
        }
        None => lines.push("*No EPS data available*".to_string()),
    }
    lines.push(String::new());
}

fn revenue_section(lines: &mut Vec<String>, revenue: Option<&RevenueStats>) {
    lines.push("### Revenue Trend".to_string());
    lines.push(String::new());
    match revenue.filter(|r| !r.annual_years.is_empty()) {
        Some(revenue) => {
            let ytd_label = format!("YTD Ann. ({}Q)", revenue.ytd_num_quarters);
            // a zero annualized figure means no current-year revenue parsed
            let current = revenue
                .ytd_annualized
                .filter(|ytd| *ytd != 0.0)
                .map(|ytd| (ytd_label.as_str(), ytd));
            lines.push(annual_table(
                "Revenue",
                &revenue.annual_years,
                &revenue.annual_values,
                Unit::DollarsLarge,
                current,
            ));
            lines.push(String::new());

            let headers: Vec<String> = [
                "Latest", "5yr Mean", "5yr CAGR", "YoY", "Prev Q", "CV", "Slope", "Outliers",
            ]
            .iter()
            .map(ToString::to_string)
            .collect();
            let row = vec![
                fmt_val(Some(revenue.latest), Unit::DollarsLarge),
                fmt_val(revenue.mean_5yr, Unit::DollarsLarge),
                fmt_val(revenue.cagr_5yr, Unit::Percent),
                fmt_delta(revenue.vs_yoy_pct, Unit::Percent),
                fmt_delta(revenue.vs_prev_q_pct, Unit::Percent),
                fmt_val(revenue.cv, Unit::Percent),
                fmt_val(revenue.slope, Unit::Ratio),
                join_or_none(&revenue.outlier_years),
            ];
            lines.push(markdown_table(&headers, &[row]));
        }
        None => lines.push("*No revenue data available*".to_string()),
    }
    lines.push(String::new());
}

fn margin_section(lines: &mut Vec<String>, margin: Option<&MarginStats>) {
    lines.push("### Operating Margin Trend".to_string());
    lines.push(String::new());
    match margin.filter(|m| !m.annual_years.is_empty()) {
        Some(margin) => {
            let ytd_label = format!("YTD ({}Q)", margin.ytd_num_quarters);
            let current = margin.ytd_margin.map(|ytd| (ytd_label.as_str(), ytd));
            lines.push(annual_table(
                "Op. Margin",
                &margin.annual_years,
                &margin.annual_values,
                Unit::Percent,
                current,
            ));
            lines.push(String::new());

            let headers: Vec<String> = [
                "Latest",
                "5yr Mean",
                "5yr CAGR",
                "YoY (pp)",
                "Prev Q (pp)",
                "CV",
                "Slope",
                "Outliers",
            ]
            .iter()
            .map(ToString::to_string)
            .collect();
            let row = vec![
                fmt_val(Some(margin.latest), Unit::Percent),
                fmt_val(margin.mean_5yr, Unit::Percent),
                fmt_val(margin.cagr_5yr, Unit::Percent),
                fmt_delta(margin.vs_yoy_pct, Unit::Percent),
                fmt_delta(margin.vs_prev_q_pct, Unit::Percent),
                fmt_val(margin.cv, Unit::Percent),
                fmt_val(margin.slope, Unit::Ratio),
                join_or_none(&margin.outlier_years),
            ];
            lines.push(markdown_table(&headers, &[row]));
        }
        None => lines.push("*No operating margin data available*".to_string()),
    }
    lines.push(String::new());
}

fn pe_section(lines: &mut Vec<String>, pe: Option<&PeStats>) {
    lines.push("### P/E Trend".to_string());
    lines.push(String::new());
    match pe.filter(|p| !p.annual_years.is_empty()) {
        Some(pe) => {
            lines.push(annual_table(
                "P/E",
                &pe.annual_years,
                &pe.annual_values,
                Unit::Ratio,
                pe.trailing_pe.map(|t| ("Trailing", t)),
            ));
            lines.push(String::new());

            let headers: Vec<String> = [
                "Trailing", "5yr Mean", "vs 5yr Avg", "YoY", "CV", "Slope", "Outliers",
            ]
            .iter()
            .map(ToString::to_string)
            .collect();
            let row = vec![
                fmt_val(pe.trailing_pe, Unit::Ratio),
                fmt_val(pe.mean_5yr, Unit::Ratio),
                fmt_delta(pe.vs_5yr_avg_pct, Unit::Percent),
                fmt_delta(pe.vs_yoy_pct, Unit::Percent),
                fmt_val(pe.cv, Unit::Percent),
                fmt_val(pe.slope, Unit::Ratio),
                join_or_none(&pe.outlier_years),
            ];
            lines.push(markdown_table(&headers, &[row]));
        }
        None => {
            lines.push("*No P/E data available (negative or insufficient earnings)*".to_string());
        }
    }
    lines.push(String::new());
}

fn estimates_section(
    lines: &mut Vec<String>,
    estimates: Option<&EstimatesStats>,
    eps: Option<&EpsStats>,
) {
    lines.push("### EPS Estimates".to_string());
    lines.push(String::new());

    let Some(estimates) = estimates else {
        lines.push("*No estimates data available*".to_string());
        lines.push(String::new());
        return;
    };

    if estimates.latest_actual_eps.is_some() {
        lines.push(format!(
            "**Latest Actual EPS:** {}",
            fmt_val(estimates.latest_actual_eps, Unit::Dollars)
        ));
        lines.push(String::new());
    }

    let horizons = [
        estimates.next_quarter.as_ref(),
        estimates.current_fiscal_year.as_ref(),
        estimates.next_fiscal_year.as_ref(),
    ];

    // EPS estimates table
    let eps_rows: Vec<Vec<String>> = horizons
        .iter()
        .copied()
        .flatten()
        .filter(|est| est.eps_avg.is_some())
        .map(|est| {
            vec![
                horizon_label(est),
                fmt_val(est.eps_avg, Unit::Dollars),
                fmt_val(est.eps_low, Unit::Dollars),
                fmt_val(est.eps_high, Unit::Dollars),
                analyst_cell(est.analyst_count),
                revision_cell(est),
            ]
        })
        .collect();

    if !eps_rows.is_empty() {
        let headers: Vec<String> = [
            "Horizon", "Consensus", "Low", "High", "Analysts", "30d Revision",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        lines.push(markdown_table(&headers, &eps_rows));
        lines.push(String::new());
    }

    // Revenue estimates table
    let revenue_rows: Vec<Vec<String>> = horizons
        .iter()
        .copied()
        .flatten()
        .filter(|est| est.revenue_avg.is_some())
        .map(|est| {
            vec![
                horizon_label(est),
                fmt_val(est.revenue_avg, Unit::DollarsLarge),
                fmt_val(est.revenue_low, Unit::DollarsLarge),
                fmt_val(est.revenue_high, Unit::DollarsLarge),
                analyst_cell(est.revenue_analyst_count),
            ]
        })
        .collect();

    if !revenue_rows.is_empty() {
        lines.push("**Revenue Estimates:**".to_string());
        lines.push(String::new());
        let headers: Vec<String> = ["Horizon", "Consensus", "Low", "High", "Analysts"]
            .iter()
            .map(ToString::to_string)
            .collect();
        lines.push(markdown_table(&headers, &revenue_rows));
        lines.push(String::new());
    }

    // Beat/miss history lives on the EPS record but belongs to this section
    if let Some(eps) = eps {
        if !eps.beat_miss_history.is_empty() {
            lines.push("**Recent Beat/Miss History:**".to_string());
            lines.push(String::new());
            let headers: Vec<String> =
                ["Quarter", "Reported", "Estimated", "Surprise", "Surprise %"]
                    .iter()
                    .map(ToString::to_string)
                    .collect();
            let rows: Vec<Vec<String>> = eps
                .beat_miss_history
                .iter()
                .map(|bm| {
                    vec![
                        bm.date.clone(),
                        fmt_val(Some(bm.reported), Unit::Dollars),
                        fmt_val(Some(bm.estimated), Unit::Dollars),
                        fmt_delta(Some(bm.surprise), Unit::Dollars),
                        fmt_delta(bm.surprise_pct, Unit::Percent),
                    ]
                })
                .collect();
            lines.push(markdown_table(&headers, &rows));
            lines.push(String::new());
        }
    }
}

fn horizon_label(est: &EstimateHorizon) -> String {
    format!(
        "{} ({})",
        est.horizon.as_deref().unwrap_or(ABSENT),
        est.date.as_deref().unwrap_or("")
    )
}

fn analyst_cell(count: Option<f64>) -> String {
    match count.filter(|c| *c != 0.0) {
        Some(count) => format!("{}", count as i64),
        None => ABSENT.to_string(),
    }
}

/// 30-day revision direction: consensus now minus the 30-day-ago snapshot
fn revision_cell(est: &EstimateHorizon) -> String {
    match (est.eps_avg, est.revision_30d) {
        (Some(avg), Some(snapshot)) => {
            let diff = crate::stats::round4(avg - snapshot);
            if diff == 0.0 {
                "flat".to_string()
            } else {
                fmt_delta(Some(diff), Unit::Dollars)
            }
        }
        _ => ABSENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{IncomeReport, IncomeStatement, MonthlyAdjusted, MonthlyBar};
    use crate::metrics::{ScreeningData, screen_ticker};

    fn sample_data() -> ScreeningData {
        let mut price = MonthlyAdjusted::default();
        for (date, close) in [
            ("2025-07-31", "110"),
            ("2025-06-30", "108"),
            ("2024-12-31", "105"),
            ("2023-12-31", "90"),
        ] {
            price.series.insert(
                date.to_string(),
                MonthlyBar {
                    adjusted_close: Some(close.to_string()),
                },
            );
        }

        let report = |date: &str, rev: &str, oi: &str| IncomeReport {
            fiscal_date_ending: date.to_string(),
            total_revenue: Some(rev.to_string()),
            operating_income: Some(oi.to_string()),
        };

        ScreeningData {
            price_monthly: Some(price),
            earnings: None,
            earnings_estimates: None,
            income: Some(IncomeStatement {
                annual_reports: vec![
                    report("2024-12-31", "120000000000", "36000000000"),
                    report("2023-12-31", "100000000000", "28000000000"),
                ],
                quarterly_reports: vec![],
            }),
        }
    }

    #[test]
    fn test_sections_degrade_independently() {
        let results = HashMap::from([(
            "AAPL".to_string(),
            screen_ticker(&sample_data(), 2025, 5),
        )]);
        let report = render_report("2025-08-27", &["AAPL".to_string()], &results);

        // populated sections render tables
        assert!(report.contains("### Price Trend"));
        assert!(report.contains("| Price |"));
        assert!(report.contains("### Revenue Trend"));

        // missing payloads render placeholders without aborting the rest
        assert!(report.contains("*No EPS data available*"));
        assert!(report.contains("*No P/E data available (negative or insufficient earnings)*"));
        assert!(report.contains("*No estimates data available*"));
        assert!(report.contains("**P/E:** —"));
        assert!(report.contains("**Estimates:** —"));
    }

    #[test]
    fn test_unknown_ticker_renders_unavailable() {
        let report = render_report("2025-08-27", &["ZZZZ".to_string()], &HashMap::new());
        assert!(report.contains("## ZZZZ"));
        assert!(report.contains("Data unavailable."));
    }

    #[test]
    fn test_report_is_deterministic() {
        let results = HashMap::from([(
            "AAPL".to_string(),
            screen_ticker(&sample_data(), 2025, 5),
        )]);
        let tickers = ["AAPL".to_string()];
        let first = render_report("2025-08-27", &tickers, &results);
        let second = render_report("2025-08-27", &tickers, &results);
        assert_eq!(first, second);
    }

    #[test]
    fn test_header_and_section_order() {
        let results = HashMap::from([(
            "AAPL".to_string(),
            screen_ticker(&sample_data(), 2025, 5),
        )]);
        let report = render_report("2025-08-27", &["AAPL".to_string()], &results);

        assert!(report.starts_with("# Stock Screening — 2025-08-27"));
        assert!(report.contains("**Tickers:** AAPL"));

        let order = [
            "### Summary",
            "### Price Trend",
            "### EPS Trend",
            "### Revenue Trend",
            "### Operating Margin Trend",
            "### P/E Trend",
            "### EPS Estimates",
        ];
        let mut last = 0;
        for section in order {
            let pos = report.find(section).expect(section);
            assert!(pos > last, "{section} out of order");
            last = pos;
        }
    }

    #[test]
    fn test_ytd_column_omitted_when_no_current_year_revenue_parses() {
        let mut data = sample_data();
        let blank = |date: &str| IncomeReport {
            fiscal_date_ending: date.to_string(),
            total_revenue: Some("None".to_string()),
            operating_income: Some("None".to_string()),
        };
        if let Some(income) = data.income.as_mut() {
            income.quarterly_reports = vec![blank("2025-06-30"), blank("2025-03-31")];
        }

        let results = HashMap::from([("AAPL".to_string(), screen_ticker(&data, 2025, 5))]);
        let report = render_report("2025-08-27", &["AAPL".to_string()], &results);

        // annual trend still renders, but the zero annualized figure is
        // suppressed rather than shown as $0
        assert!(report.contains("### Revenue Trend"));
        assert!(!report.contains("YTD Ann."));
    }

    #[test]
    fn test_revision_cell() {
        let mut est = EstimateHorizon {
            eps_avg: Some(1.85),
            revision_30d: Some(1.80),
            ..Default::default()
        };
        assert_eq!(revision_cell(&est), "+$0.05");

        est.revision_30d = Some(1.85);
        assert_eq!(revision_cell(&est), "flat");

        est.revision_30d = None;
        assert_eq!(revision_cell(&est), "—");
    }
}
