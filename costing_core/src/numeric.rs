//! # Lenient Numeric Fields
//!
//! Costing forms submit numbers as whatever the browser or spreadsheet hands
//! over: JSON numbers, numeric strings, empty strings or outright junk. This
//! module turns those into `f64` without ever failing, plus the fixed-decimal
//! rounding used when values leave the calculator.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::numeric::{FieldValue, round_half_away};
//!
//! assert_eq!(FieldValue::from("  30 ").as_number(), Some(30.0));
//! assert_eq!(FieldValue::from("abc").as_number(), None);
//! assert_eq!(round_half_away(0.125, 2), 0.13);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decimal places kept for weight-class outputs (kg per 100 m).
pub const WEIGHT_DECIMALS: u32 = 4;

/// Decimal places kept for currency-class outputs.
pub const CURRENCY_DECIMALS: u32 = 2;

/// A numeric form field as submitted: a number, text, or something else.
///
/// Deserializes from any JSON value. Anything that is not a finite number or
/// a string holding one resolves to "no value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl FieldValue {
    /// The parsed value, or `None` when absent, non-numeric or non-finite.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => parse_number(s),
            FieldValue::Other(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// A JSON value as form text. `null` is empty, numbers and booleans are
/// printed, strings pass through untouched.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `deserialize_with` helper for free-text form fields that may arrive as
/// `null` or a number.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| value_as_text(&value))
}

/// Parse trimmed text as a finite `f64`.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Value of an optional field, `0.0` when missing or unparseable.
pub fn number_or_zero(field: Option<&FieldValue>) -> f64 {
    number_or(field, 0.0)
}

/// Value of an optional field, `default` when missing or unparseable.
pub fn number_or(field: Option<&FieldValue>, default: f64) -> f64 {
    field.and_then(FieldValue::as_number).unwrap_or(default)
}

/// Round to `places` decimals, ties away from zero.
///
/// Non-finite values pass through untouched.
pub fn round_half_away(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid "-0" in stored cells
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a weight-class value (4 decimals).
pub fn round_weight(value: f64) -> f64 {
    round_half_away(value, WEIGHT_DECIMALS)
}

/// Round a currency-class value (2 decimals).
pub fn round_currency(value: f64) -> f64 {
    round_half_away(value, CURRENCY_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_parsing() {
        assert_eq!(FieldValue::from("12.5").as_number(), Some(12.5));
        assert_eq!(FieldValue::from(" 7 ").as_number(), Some(7.0));
        assert_eq!(FieldValue::from("").as_number(), None);
        assert_eq!(FieldValue::from("abc").as_number(), None);
        assert_eq!(FieldValue::from("NaN").as_number(), None);
        assert_eq!(FieldValue::from("inf").as_number(), None);
    }

    #[test]
    fn test_json_shapes() {
        let n: FieldValue = serde_json::from_str("30").unwrap();
        assert_eq!(n.as_number(), Some(30.0));

        let s: FieldValue = serde_json::from_str("\"0.2\"").unwrap();
        assert_eq!(s.as_number(), Some(0.2));

        let b: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(b.as_number(), None);

        let o: FieldValue = serde_json::from_str("{\"x\": 1}").unwrap();
        assert_eq!(o.as_number(), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(number_or_zero(None), 0.0);
        assert_eq!(number_or(None, 12.0), 12.0);
        assert_eq!(number_or(Some(&FieldValue::from("x")), 700.0), 700.0);
        assert_eq!(number_or(Some(&FieldValue::from(3.0)), 700.0), 3.0);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_half_away(2.5, 0), 3.0);
        assert_eq!(round_half_away(-2.5, 0), -3.0);
        assert_eq!(round_currency(302.081472), 302.08);
        assert_eq!(round_weight(38.53084999), 38.5308);
        assert_eq!(round_weight(0.00004), 0.0);
        assert!(round_weight(-0.00004).is_sign_positive());
    }
}
