//! Lenient numeric parsing for form-sourced payloads.
//!
//! Search filters and new listings arrive from HTML forms, where every value
//! is a string. These helpers accept either JSON numbers or strings and read
//! strings by their leading numeric prefix, so `"4.5"` and `" 3 rooms"` both
//! parse while `""` and `"abc"` do not.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("leading number pattern is valid")
});

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("leading integer pattern is valid"));

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Parses the leading decimal number of `s`.
pub fn parse_leading_number(s: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses the leading integer of `s`, ignoring any fractional part.
pub fn parse_leading_integer(s: &str) -> Option<i64> {
    LEADING_INTEGER
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Truncates a float toward zero if it fits in an `i32`.
pub(crate) fn truncate_to_i32(n: f64) -> Option<i32> {
    if n.is_finite() && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) {
        Some(n.trunc() as i32)
    } else {
        None
    }
}

fn integer_from(value: NumberOrString) -> Option<i32> {
    match value {
        NumberOrString::Number(n) => truncate_to_i32(n),
        NumberOrString::Text(s) => parse_leading_integer(&s).and_then(|v| i32::try_from(v).ok()),
    }
}

/// Deserializes an optional number; unparsable strings become `None`.
pub fn option_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => parse_leading_number(&s),
    })
}

/// Deserializes an optional integer; unparsable strings become `None`.
pub fn option_integer<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.and_then(integer_from))
}

/// Deserializes a required integer; unparsable values are an error.
pub fn integer<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberOrString::deserialize(deserializer)?;
    let message = match &value {
        NumberOrString::Number(n) => format!("integer out of range: {}", n),
        NumberOrString::Text(s) => format!("expected an integer, found {:?}", s),
    };
    integer_from(value).ok_or_else(|| D::Error::custom(message))
}
