//! Lenient numeric fields
//!
//! Sensor gateways send readings either as JSON numbers or as numeric
//! strings. Both are accepted; anything that is not a finite number is a
//! deserialization error and surfaces as a 400.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Finite `f64` from a number or a numeric string
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("'{}' is not a number", s)))?,
    };

    if !value.is_finite() {
        return Err(de::Error::custom("value must be a finite number"));
    }
    Ok(value)
}

/// Integer class label; range checks are left to validation
pub fn label<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match LabelValue::deserialize(deserializer)? {
        LabelValue::Int(i) => i,
        LabelValue::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
        LabelValue::Float(f) => {
            return Err(de::Error::custom(format!("label must be an integer, got {}", f)))
        }
        LabelValue::Bool(b) => i64::from(b),
        LabelValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("'{}' is not an integer label", s)))?,
    };

    u8::try_from(raw).map_err(|_| de::Error::custom(format!("label {} out of range", raw)))
}

/// Optional variant of [`label`]; `null` and an absent key both give `None`
pub fn opt_label<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "label")] u8);

    let value: Option<Wrapped> = Option::deserialize(deserializer)?;
    Ok(value.map(|Wrapped(v)| v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Reading {
        #[serde(deserialize_with = "number")]
        power: f64,
        #[serde(default, deserialize_with = "opt_label")]
        detection: Option<u8>,
    }

    fn parse(value: serde_json::Value) -> Result<Reading, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_number_or_string() {
        assert_eq!(parse(json!({"power": 5.5})).unwrap().power, 5.5);
        assert_eq!(parse(json!({"power": "7.25"})).unwrap().power, 7.25);
        assert_eq!(parse(json!({"power": 3})).unwrap().power, 3.0);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(parse(json!({"power": "high"})).is_err());
        assert!(parse(json!({"power": "NaN"})).is_err());
        assert!(parse(json!({"power": "inf"})).is_err());
        assert!(parse(json!({"power": null})).is_err());
        assert!(parse(json!({})).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(parse(json!({"power": 1, "detection": 1})).unwrap().detection, Some(1));
        assert_eq!(parse(json!({"power": 1, "detection": "0"})).unwrap().detection, Some(0));
        assert_eq!(parse(json!({"power": 1, "detection": null})).unwrap().detection, None);
        assert_eq!(parse(json!({"power": 1})).unwrap().detection, None);
        assert!(parse(json!({"power": 1, "detection": -1})).is_err());
        assert!(parse(json!({"power": 1, "detection": 0.5})).is_err());
    }
}
