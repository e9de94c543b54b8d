//! Forgiving deserializers for request fields.
//!
//! Browsers send everything as strings and hand-written clients send whatever they
//! like, so numeric fields coerce instead of failing: numbers and numeric strings
//! parse, anything else becomes `0`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Best-effort integer from any JSON value.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(0),
        Value::String(text) => parse_int(text).unwrap_or(0),
        Value::Bool(flag) => i64::from(*flag),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

/// Integer from numeric text, truncating decimals. `None` for anything else.
#[allow(clippy::cast_possible_truncation)]
fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|float| float.is_finite())
            .map(|float| float as i64)
    })
}

pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(coerce_int(&Value::deserialize(deserializer)?))
}

/// `null` and `""` mean "not sent"; any other value coerces.
pub fn option_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        other => Some(coerce_int(&other)),
    })
}

/// Like [`option_int`] but unparseable input is `None` rather than `0`, so a
/// garbage column index can never select the first column.
pub fn option_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn stringify(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn option_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(stringify(Value::deserialize(deserializer)?))
}

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(stringify(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Column switches such as `searchable`. Only an explicit `false` (boolean, or
/// the strings `"false"`/`"0"` in any case) turns a switch off; anything else
/// leaves it on.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => {
            let text = text.trim();
            !(text.eq_ignore_ascii_case("false") || text == "0")
        }
        _ => true,
    })
}
