use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{format_number, CellValue};

// Longest numeric prefix after leading whitespace, the way `parseFloat` reads it.
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\x{FEFF}]*([+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))")
        .expect("numeric prefix pattern is valid")
});

/// Liberal numeric coercion. `"42kg"` is 42, `"kg42"` is nothing, numbers
/// are themselves, booleans and blanks never coerce. NaN is never returned.
pub fn coerce_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if !n.is_nan() => Some(*n),
        CellValue::Text(s) => parse_float_prefix(s),
        _ => None,
    }
}

pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let caps = NUMERIC_PREFIX.captures(s)?;
    caps.get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
}

/// Two decimals, rounding half away from zero on the exact binary value.
/// From `1e21` up the plain number form is used instead.
pub fn format_fixed2(x: f64) -> String {
    if !x.is_finite() || x.abs() >= 1e21 {
        return format_number(x);
    }
    if x == 0.0 {
        return "0.00".to_string();
    }

    // Only an odd number of binary eighths (.125, .375, ...) sits on a tie at
    // two decimals; everything else `{:.2}` already rounds correctly.
    let eighths = x.abs() * 8.0;
    if eighths.fract() == 0.0 && eighths < 9_007_199_254_740_992.0 && (eighths as u64) % 2 == 1 {
        let cents = (eighths as u64 * 25 + 1) / 2;
        let sign = if x < 0.0 { "-" } else { "" };
        return format!("{}{}.{:02}", sign, cents / 100, cents % 100);
    }
    format!("{:.2}", x)
}
