//! Number formatting for markdown summaries.

use std::fmt::Display;

/// Shortest round-trip rendering, as clients print numbers: `100`, `1.5`.
pub(crate) fn number(value: f64) -> String {
    if value == 0.0 {
        // covers -0
        return "0".to_string();
    }
    value.to_string()
}

/// A worker field as text; absent or null values read `null`.
pub(crate) fn or_null<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

/// Fixed-point with `digits` decimals, rounding halves away from zero.
pub(crate) fn fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    format!("{:.*}", digits, (value * scale).round() / scale)
}

/// A 0-1 ratio as a whole percentage, without the sign.
pub(crate) fn percent(ratio: f64) -> String {
    fixed(ratio * 100.0, 0)
}

/// Whole number with `,` thousands separators.
pub(crate) fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Arithmetic mean; zero for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Group items by key, keeping keys in first-seen order.
pub(crate) fn group_by<T>(items: &[T], key: impl Fn(&T) -> &str) -> Vec<(&str, Vec<&T>)> {
    let mut groups: Vec<(&str, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(name, _)| *name == k) {
            Some((_, group)) => group.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}
