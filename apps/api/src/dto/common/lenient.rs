//! Numeric fields that also accept string-encoded values such as `"97.5"`.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Deserializes an optional decimal from a JSON number or numeric string.
pub fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<LenientNumber>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(LenientNumber::Integer(value)) => value as f64,
        Some(LenientNumber::Float(value)) => value,
        Some(LenientNumber::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("'{text}' is not a number")))?
        }
    };

    if !value.is_finite() {
        return Err(D::Error::custom("number must be finite"));
    }

    Ok(Some(value))
}

/// Deserializes an optional integer from a JSON number or numeric string.
///
/// Decimals with a fractional part are rejected.
pub fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<LenientNumber>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(LenientNumber::Integer(value)) => return Ok(Some(value)),
        Some(LenientNumber::Float(value)) => value,
        Some(LenientNumber::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if let Ok(value) = trimmed.parse::<i64>() {
                return Ok(Some(value));
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("'{text}' is not an integer")))?
        }
    };

    if value.fract() != 0.0 || !value.is_finite() || value.abs() > i64::MAX as f64 {
        return Err(D::Error::custom(format!("{value} is not an integer")));
    }

    Ok(Some(value as i64))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "super::optional_f64")]
        rate: Option<f64>,
        #[serde(default, deserialize_with = "super::optional_i64")]
        count: Option<i64>,
    }

    fn sample(value: serde_json::Value) -> Option<Sample> {
        serde_json::from_value(value).ok()
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        let parsed = sample(json!({"rate": "97.5", "count": "3"}));
        assert_eq!(parsed.as_ref().and_then(|sample| sample.rate), Some(97.5));
        assert_eq!(parsed.as_ref().and_then(|sample| sample.count), Some(3));

        let parsed = sample(json!({"rate": 80, "count": 4.0}));
        assert_eq!(parsed.as_ref().and_then(|sample| sample.rate), Some(80.0));
        assert_eq!(parsed.as_ref().and_then(|sample| sample.count), Some(4));
    }

    #[test]
    fn absent_null_and_blank_are_none() {
        let parsed = sample(json!({"rate": null, "count": " "}));
        assert!(parsed.as_ref().is_some_and(|sample| sample.rate.is_none()));
        assert!(parsed.as_ref().is_some_and(|sample| sample.count.is_none()));
        assert!(sample(json!({})).is_some_and(|sample| sample.rate.is_none()));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(sample(json!({"rate": "ninety"})).is_none());
        assert!(sample(json!({"rate": "NaN"})).is_none());
        assert!(sample(json!({"count": 2.5})).is_none());
        assert!(sample(json!({"count": true})).is_none());
    }

    proptest! {
        #[test]
        fn string_encoded_decimals_match_numbers(whole in 0u32..100, tenths in 0u32..10) {
            let text = format!("{whole}.{tenths}");
            let expected: f64 = text.parse().unwrap_or_default();
            let from_text = sample(json!({"rate": text})).and_then(|sample| sample.rate);
            let from_number = sample(json!({"rate": expected})).and_then(|sample| sample.rate);
            prop_assert_eq!(from_text, Some(expected));
            prop_assert_eq!(from_number, Some(expected));
        }
    }
}
