use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a JSON number, a numeric string, or anything else as `None`.
///
/// Form state arrives from `<input type="number">` fields which may hold
/// `""`, `null` or `NaN`-turned-`null`; those are normalized later.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Field {
        #[serde(default, deserialize_with = "super::number")]
        n: Option<f64>,
    }

    fn field(json: &str) -> Option<f64> {
        serde_json::from_str::<Field>(json).unwrap().n
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(field(r#"{"n": 12}"#), Some(12.0));
        assert_eq!(field(r#"{"n": 0.25}"#), Some(0.25));
        assert_eq!(field(r#"{"n": " 40 "}"#), Some(40.0));
    }

    #[test]
    fn ignores_everything_else() {
        assert_eq!(field(r#"{"n": null}"#), None);
        assert_eq!(field(r#"{"n": ""}"#), None);
        assert_eq!(field(r#"{"n": true}"#), None);
        assert_eq!(field(r#"{"n": [1]}"#), None);
        assert_eq!(field(r#"{}"#), None);
    }
}
