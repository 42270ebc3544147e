use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

/// Minimal timestamp used for placeholder rows (`1970-01-01 00:00:00`).
pub fn epoch_timestamp() -> NaiveDateTime {
    NaiveDateTime::default()
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Canonical rendering used for key membership and delimited output.
    ///
    /// Values of different variants that render identically share a key, so
    /// `Int(3)` matches `Text("3")`.
    pub fn key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Text(value) => value.clone(),
            Value::Date(value) => value.format(DATE_FORMAT).to_string(),
            Value::Timestamp(value) => value.format(TIMESTAMP_FORMATS[0]).to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Interpret the value as a point in time; dates map to midnight and
    /// text is parsed with the same formats the CSV loader accepts.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(value) => Some(*value),
            Value::Date(value) => value.and_hms_opt(0, 0, 0),
            Value::Text(value) => match Value::parse(value) {
                Value::Timestamp(parsed) => Some(parsed),
                Value::Date(parsed) => parsed.and_hms_opt(0, 0, 0),
                _ => None,
            },
            _ => None,
        }
    }

    /// Parse a raw delimited-file cell into the narrowest matching value.
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_null_literal(trimmed) {
            return Value::Null;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }

        if let Some(value) = parse_integer(trimmed) {
            return value;
        }

        if let Some(value) = parse_float(trimmed) {
            return Value::Float(value);
        }

        for format in TIMESTAMP_FORMATS {
            if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Value::Timestamp(value);
            }
        }

        if let Ok(value) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Value::Date(value);
        }

        Value::Text(trimmed.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

fn is_null_literal(value: &str) -> bool {
    ["null", "nan", "none", "nat"]
        .iter()
        .any(|literal| value.eq_ignore_ascii_case(literal))
}

fn parse_integer(value: &str) -> Option<Value> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Leading zeros (phone numbers, ICCIDs) and overflowing digit strings stay text.
    if digits.len() > 1 && digits.starts_with('0') {
        return Some(Value::Text(value.to_string()));
    }
    match value.parse::<i64>() {
        Ok(parsed) => Some(Value::Int(parsed)),
        Err(_) => Some(Value::Text(value.to_string())),
    }
}

// Plain decimal notation only; exponent forms such as `1E5` are identifiers.
fn parse_float(value: &str) -> Option<f64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (whole, fraction) = digits.split_once('.')?;
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_detects_narrowest_variant() {
        assert_eq!(Value::parse(""), Value::Null);
        assert_eq!(Value::parse("NaN"), Value::Null);
        assert_eq!(Value::parse("True"), Value::Bool(true));
        assert_eq!(Value::parse("42"), Value::Int(42));
        assert_eq!(Value::parse("-7"), Value::Int(-7));
        assert_eq!(Value::parse("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse("A1"), Value::Text("A1".to_string()));
        assert_eq!(
            Value::parse("2024-03-01"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(
            Value::parse("2024-03-01 10:15:00"),
            Value::Timestamp(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(10, 15, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn leading_zero_digits_stay_text() {
        assert_eq!(
            Value::parse("0237650001"),
            Value::Text("0237650001".to_string())
        );
        assert_eq!(
            Value::parse("89237012345678901234"),
            Value::Text("89237012345678901234".to_string())
        );
    }

    #[test]
    fn keys_match_across_variants() {
        assert_eq!(Value::Int(3).key(), Value::Text("3".to_string()).key());
        assert_eq!(
            Value::Timestamp(epoch_timestamp()).key(),
            "1970-01-01 00:00:00"
        );
        assert_eq!(Value::Null.key(), "");
    }

    #[test]
    fn exponent_notation_stays_text() {
        assert_eq!(Value::parse("1E5"), Value::Text("1E5".to_string()));
        assert_eq!(Value::parse("2e-3"), Value::Text("2e-3".to_string()));
        assert_ne!(Value::parse("1E5").key(), Value::parse("100000").key());
        assert_eq!(Value::parse("-.5"), Value::Float(-0.5));
    }

    #[test]
    fn millisecond_timestamps_keep_fraction() {
        let value = Value::parse("2023-05-04 08:09:10.250");
        assert_eq!(value.key(), "2023-05-04 08:09:10.250");
    }
}
