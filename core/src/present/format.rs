use crate::spatial::sqft_to_acres;

/// Groups thousands with commas and keeps at most three fraction digits,
/// dropping trailing zeros: `43560` -> `43,560`, `1234.5678` -> `1,234.568`.
pub fn thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 5);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && (integer != "0" || !fraction.is_empty());
    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

pub fn square_feet(sqft: f64) -> String {
    format!("{} sq ft", thousands(sqft))
}

/// Acre figure with the given number of decimals.
pub fn acres(sqft: f64, decimals: usize) -> String {
    format!("{:.*} acres", decimals, sqft_to_acres(sqft))
}

pub fn percent(pct: f64) -> String {
    format!("{:.1}%", pct)
}

pub fn seconds(ms: f64) -> String {
    format!("{:.1}s", ms / 1000.0)
}
