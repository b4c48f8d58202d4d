//! Numeric primitives shared by the metric calculators
//!
//! Every function operates over an ordered sequence of optional values and
//! degrades to `None` (or an empty list) when the clean inputs are too
//! sparse, so the calculators never have to guard before calling them.
//! Percentage and ratio results are rounded to two decimal places at the
//! point of computation; the report layer never re-rounds.

use serde::Serialize;

/// Change between the two most recent clean values in a series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecentDelta {
    pub absolute: Option<f64>,
    pub percent: Option<f64>,
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to four decimal places (EPS surprise granularity)
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Lenient string-to-float parse for API fields
///
/// Alpha Vantage encodes missing numerics as the literal string `"None"`
/// or an empty string; both map to `None`, as does unparseable text.
pub fn safe_f64(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() || raw == "None" {
        return None;
    }
    raw.parse::<f64>().ok()
}

/// Percentage `num / denom * 100`, absent on a missing or zero denominator
pub fn pct(num: Option<f64>, denom: Option<f64>) -> Option<f64> {
    match (num, denom) {
        (Some(n), Some(d)) if d != 0.0 => Some(round2(n / d * 100.0)),
        _ => None,
    }
}

fn clean(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().copied().flatten().collect()
}

/// Arithmetic mean of the non-null entries, `None` if there are none
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let clean = clean(values);
    if clean.is_empty() {
        return None;
    }
    Some(round2(clean.iter().sum::<f64>() / clean.len() as f64))
}

/// Compound annual growth rate, expressed as a percentage
///
/// Defined only when at least two clean values exist and the first and last
/// are strictly positive. The exponent denominator is the clean count minus
/// one, so gaps in the series compress the growth window; this is a known
/// approximation carried over from the report's original methodology.
pub fn cagr(values: &[Option<f64>]) -> Option<f64> {
    let clean = clean(values);
    if clean.len() < 2 {
        return None;
    }
    let (first, last) = (clean[0], clean[clean.len() - 1]);
    if first <= 0.0 || last <= 0.0 {
        return None;
    }
    let years = (clean.len() - 1) as f64;
    Some(round2(((last / first).powf(1.0 / years) - 1.0) * 100.0))
}

/// Coefficient of variation: population std-dev over |mean|, as a percentage
pub fn coefficient_of_variation(values: &[Option<f64>]) -> Option<f64> {
    let clean = clean(values);
    if clean.len() < 2 {
        return None;
    }
    let avg = clean.iter().sum::<f64>() / clean.len() as f64;
    if avg == 0.0 {
        return None;
    }
    let variance = clean.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / clean.len() as f64;
    Some(round2(variance.sqrt() / avg.abs() * 100.0))
}

/// Ordinary-least-squares slope of value against original index
///
/// Missing entries are skipped but keep their positional x value, so a
/// series with gaps still slopes against calendar position.
pub fn slope(values: &[Option<f64>]) -> Option<f64> {
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();
    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    Some(round2((n * sum_xy - sum_x * sum_y) / denominator))
}

/// Absolute and percent change between the last two clean values
pub fn recent_delta(values: &[Option<f64>]) -> RecentDelta {
    let clean = clean(values);
    if clean.len() < 2 {
        return RecentDelta::default();
    }
    let (recent, prior) = (clean[clean.len() - 1], clean[clean.len() - 2]);
    let absolute = Some(round2(recent - prior));
    let percent = if prior != 0.0 {
        Some(round2((recent - prior) / prior.abs() * 100.0))
    } else {
        None
    };
    RecentDelta { absolute, percent }
}

/// Indices of values lying outside mean ± 2 population std-devs
///
/// Indices are positions in the original (pre-filter) sequence so callers
/// can map them back onto parallel period labels. Requires at least three
/// clean values, otherwise no outlier call is made.
pub fn outliers(values: &[Option<f64>]) -> Vec<usize> {
    let points: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    if points.len() < 3 {
        return Vec::new();
    }
    let n = points.len() as f64;
    let mean = points.iter().map(|(_, v)| v).sum::<f64>() / n;
    let variance = points.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let (lower, upper) = (mean - 2.0 * std_dev, mean + 2.0 * std_dev);
    points
        .iter()
        .filter(|(_, v)| *v < lower || *v > upper)
        .map(|(i, _)| *i)
        .collect()
}

/// Wrap a dense slice for the optional-value primitives
pub fn present(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}
