//! Derived values: arg-max between two numeric-bearing strings, and the
//! coverage ratio. Both parse numbers leniently: longest numeric prefix,
//! zero otherwise.

use once_cell::sync::Lazy;
use regex::Regex;

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("float prefix regex")
});

static INT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?\d+").expect("int prefix regex"));

/// `atof`-style conversion: `"12.5kg"` is 12.5, `"abc"` and `""` are 0.
pub fn lenient_f64(text: &str) -> f64 {
    FLOAT_PREFIX
        .find(text)
        .and_then(|m| m.as_str().trim_start().parse().ok())
        .unwrap_or(0.0)
}

/// `atoi`-style conversion, `None` when there is no leading integer.
pub fn leading_int(text: &str) -> Option<i64> {
    INT_PREFIX
        .find(text)
        .and_then(|m| m.as_str().trim_start().parse().ok())
}

/// Returns the text of whichever operand is numerically larger; ties go to
/// `first`. A lone present operand is returned as-is, without parsing.
pub fn arg_max<'a>(first: Option<&'a str>, second: Option<&'a str>) -> Option<&'a str> {
    match (first, second) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => {
            if lenient_f64(a) >= lenient_f64(b) {
                Some(a)
            } else {
                Some(b)
            }
        }
    }
}

/// `numerator / denominator`, or `None` when either side is missing or the
/// denominator is zero.
pub fn ratio(numerator: Option<&str>, denominator: Option<&str>) -> Option<f64> {
    let numerator = numerator.filter(|s| !s.is_empty())?;
    let denominator = lenient_f64(denominator.filter(|s| !s.is_empty())?);
    if denominator == 0.0 {
        return None;
    }
    Some(lenient_f64(numerator) / denominator)
}
