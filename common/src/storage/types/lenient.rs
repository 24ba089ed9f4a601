//! Field deserializers for manifests written by the external pipeline.
//!
//! A field holding the wrong JSON type is read as absent instead of failing
//! the whole document, so one bad scene or question only loses itself.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Integers only; `"1"` and `1.0` are rejected.
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}

pub fn index<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok()))
}

/// Answer options keep their positions; non-string entries are rendered as JSON text.
pub fn options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Elements that fail to parse as `T` are dropped.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| debug!(error = %e, "Skipping unreadable manifest entry"))
                    .ok()
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "string")]
        name: Option<String>,
        #[serde(default, deserialize_with = "integer")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "index")]
        position: Option<u32>,
        #[serde(default, deserialize_with = "options")]
        choices: Vec<String>,
        #[serde(default, deserialize_with = "list")]
        numbers: Vec<u8>,
    }

    #[test]
    fn wrong_types_read_as_absent() {
        let parsed: Fields = serde_json::from_value(json!({
            "name": 5,
            "count": "1",
            "position": -2,
            "choices": "A",
            "numbers": { "a": 1 }
        }))
        .expect("lenient parse");

        assert_eq!(parsed.name, None);
        assert_eq!(parsed.count, None);
        assert_eq!(parsed.position, None);
        assert!(parsed.choices.is_empty());
        assert!(parsed.numbers.is_empty());
    }

    #[test]
    fn well_typed_values_are_kept() {
        let parsed: Fields = serde_json::from_value(json!({
            "name": "Doc",
            "count": 3,
            "position": 2,
            "choices": ["A", 42, true],
            "numbers": [1, "two", 3]
        }))
        .expect("lenient parse");

        assert_eq!(parsed.name.as_deref(), Some("Doc"));
        assert_eq!(parsed.count, Some(3));
        assert_eq!(parsed.position, Some(2));
        assert_eq!(parsed.choices, vec!["A", "42", "true"]);
        assert_eq!(parsed.numbers, vec![1, 3]);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let parsed: Fields = serde_json::from_value(json!({})).expect("lenient parse");
        assert_eq!(parsed.name, None);
        assert!(parsed.numbers.is_empty());
    }
}
