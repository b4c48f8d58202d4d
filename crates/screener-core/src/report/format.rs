//! Value formatting and Markdown table rendering
//!
//! All numeric cells in the report flow through [`fmt_val`] / [`fmt_delta`]
//! keyed by a unit tag, so the formatting contract lives in one place.
//! Absent values always render as an em-dash.

/// Unit tag selecting the formatting rule for a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// `$X,XXX.XX`
    Dollars,
    /// `$X.XXB` / `$X.XM` / `$X` depending on magnitude
    DollarsLarge,
    /// `X.XX%`
    Percent,
    /// `X.XX`
    Ratio,
    /// Bare value
    Plain,
}

/// Cell marker for values that could not be computed
pub const ABSENT: &str = "—";

/// Format a value for display
pub fn fmt_val(val: Option<f64>, unit: Unit) -> String {
    render(val, unit, false)
}

/// Format a delta value: positive values gain a `+` prefix
pub fn fmt_delta(val: Option<f64>, unit: Unit) -> String {
    render(val, unit, true)
}

fn render(val: Option<f64>, unit: Unit, is_delta: bool) -> String {
    let Some(val) = val else {
        return ABSENT.to_string();
    };
    let prefix = if is_delta && val > 0.0 { "+" } else { "" };
    match unit {
        Unit::Dollars => format!("{prefix}${}", grouped(val, 2)),
        Unit::DollarsLarge => {
            if val.abs() >= 1e9 {
                format!("{prefix}${}B", grouped(val / 1e9, 2))
            } else if val.abs() >= 1e6 {
                format!("{prefix}${}M", grouped(val / 1e6, 1))
            } else {
                format!("{prefix}${}", grouped(val, 0))
            }
        }
        Unit::Percent => format!("{prefix}{val:.2}%"),
        Unit::Ratio => format!("{prefix}{val:.2}"),
        Unit::Plain => format!("{prefix}{val}"),
    }
}

/// Fixed-decimal rendering with thousands separators in the integer part
fn grouped(val: f64, decimals: usize) -> String {
    let formatted = format!("{val:.decimals$}");
    let (sign, digits) = formatted
        .strip_prefix('-')
        .map_or(("", formatted.as_str()), |rest| ("-", rest));
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut reversed = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (count, ch) in int_part.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            reversed.push(',');
        }
        reversed.push(ch);
    }
    let int_grouped: String = reversed.chars().rev().collect();

    match frac_part {
        Some(frac) => format!("{sign}{int_grouped}.{frac}"),
        None => format!("{sign}{int_grouped}"),
    }
}

/// Render a pipe-delimited Markdown table (no trailing newline)
pub fn markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str("| ");
    out.push_str(&headers.join(" | "));
    out.push_str(" |\n|");
    out.push_str(&headers.iter().map(|_| " --- ").collect::<Vec<_>>().join("|"));
    out.push('|');
    for row in rows {
        out.push_str("\n| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |");
    }
    out
}

/// Comma-joined label list, or the literal text `None` when empty
pub fn join_or_none(labels: &[String]) -> String {
    if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join(", ")
    }
}
