//! Value coercions shared by the criteria matcher and the D-function reducers.

use once_cell::sync::Lazy;
use regex::Regex;
use sheetdb_common::LiteralValue;
use std::borrow::Cow;

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float prefix regex")
});

static WHOLE_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?\s*$").expect("valid float regex")
});

/// Parse the longest decimal float at the start of `s`, ignoring leading
/// whitespace and any trailing garbage (`"12kg"` reads as 12).
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let m = LEADING_FLOAT.find(s)?;
    m.as_str().trim_start().parse::<f64>().ok()
}

/// Parse `s` as a number only when the whole string (modulo surrounding
/// whitespace) is a decimal float.
pub fn parse_numeric_text(s: &str) -> Option<f64> {
    if !WHOLE_FLOAT.is_match(s) {
        return None;
    }
    s.trim().parse::<f64>().ok()
}

/// Numeric reading used by the summing/counting D-functions: numbers as-is,
/// text through its leading float. Booleans, blanks and errors never count.
pub fn numeric_entry(v: &LiteralValue) -> Option<f64> {
    match v {
        LiteralValue::Number(n) => Some(*n),
        LiteralValue::Int(i) => Some(*i as f64),
        LiteralValue::Text(s) => parse_leading_float(s),
        _ => None,
    }
}

/// Text form of a cell as written in a criteria block or header row.
pub fn criteria_text(v: &LiteralValue) -> Cow<'_, str> {
    match v {
        LiteralValue::Text(s) => Cow::Borrowed(s.as_str()),
        LiteralValue::Empty => Cow::Borrowed(""),
        LiteralValue::Boolean(true) => Cow::Borrowed("TRUE"),
        LiteralValue::Boolean(false) => Cow::Borrowed("FALSE"),
        other => Cow::Owned(other.to_string()),
    }
}
