//! Common utilities used across the crate.
//!
//! Statistics over `f64` slices, lenient number parsing for catalog cells, and
//! number formatting for question text.

use std::cmp::Ordering;

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Arithmetic mean. Returns `0.0` for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance. Returns `0.0` for an empty slice.
#[inline]
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Sort a copy of `values` ascending. NaN compares equal to everything.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Nearest-rank quantile over an ascending slice: `sorted[floor(n * p)]`.
///
/// No interpolation. The index is clamped to the last element, so `p = 1.0`
/// returns the maximum. Returns `NaN` for an empty slice.
#[inline]
pub fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let idx = ((sorted.len() as f64) * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Median as the middle element of an ascending slice (index `n / 2`).
#[inline]
pub fn median(sorted: &[f64]) -> f64 {
    nearest_rank(sorted, 0.5)
}

/// Midpoints between consecutive distinct values of an ascending slice.
pub fn midpoints(sorted: &[f64]) -> Vec<f64> {
    let mut out = Vec::new();
    for pair in sorted.windows(2) {
        if pair[1] > pair[0] {
            out.push((pair[0] + pair[1]) / 2.0);
        }
    }
    out
}

/// Keep at most `max` items, picked evenly across the slice (first and last kept).
pub fn downsample<T: Copy>(items: &[T], max: usize) -> Vec<T> {
    if items.len() <= max || max == 0 {
        return items.to_vec();
    }
    if max == 1 {
        return vec![items[items.len() / 2]];
    }
    let last = items.len() - 1;
    (0..max)
        .map(|i| items[(i * last + (max - 1) / 2) / (max - 1)])
        .collect()
}

/// Number of distinct values (exact float equality).
pub fn count_unique(values: &[f64]) -> usize {
    let s = sorted(values);
    let mut count = 0;
    let mut prev: Option<f64> = None;
    for v in s {
        if prev != Some(v) {
            count += 1;
            prev = Some(v);
        }
    }
    count
}

/// Dot product over the common prefix of two slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean distance over the common prefix of two slices.
#[inline]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a catalog cell as a number.
///
/// Accepts surrounding whitespace, a leading currency sign, thousands separators and a
/// trailing percent sign (`"$1,299.00"`, `"45%"`). Non-finite results are rejected.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = trimmed
        .trim_start_matches(['$', '€', '£'])
        .trim_end_matches('%')
        .replace(',', "");
    let value: f64 = stripped.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

// =============================================================================
// Formatting
// =============================================================================

/// Format a number for question text.
///
/// Integers print without decimals, values of 1000 and above get thousands separators,
/// everything else keeps up to two decimals with trailing zeros removed.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.abs() >= 1000.0 {
        return group_thousands(rounded.round());
    }
    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a number as a dollar amount (`$12`, `$12.50`, `$1,299`).
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let abs = rounded.abs();
    if abs >= 1000.0 || abs.fract() == 0.0 {
        return format!("{}${}", sign, group_thousands(abs.round()));
    }
    format!("{}${:.2}", sign, abs)
}

fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let digits = format!("{}", value.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
