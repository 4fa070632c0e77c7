//! Field-level deserializers for feed records whose shapes drift.
//!
//! Each helper accepts any JSON value and degrades a wrong shape to "absent", so one bad field
//! never fails the record that carries it.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Display text of a scalar: strings as-is, numbers rendered. Anything else is absent.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Optional text field; non-scalar values read as `None`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_text))
}

/// Optional nested record; a value of the wrong shape reads as `None`.
pub fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// List of records; entries that fail to parse are skipped with a warning.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            warn!(target: "snapshot", found = %other, "expected a list; ignoring");
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(target: "snapshot", error = %err, "skipping malformed entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Rung {
        price: f64,
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "record")]
        rung: Option<Rung>,
        #[serde(default, deserialize_with = "records")]
        rungs: Vec<Rung>,
    }

    #[test]
    fn scalar_text_is_kept_and_numbers_rendered() {
        let h: Holder = serde_json::from_value(json!({"name": 42})).expect("holder");
        assert_eq!(h.name.as_deref(), Some("42"));
        let h: Holder = serde_json::from_value(json!({"name": "Ascot"})).expect("holder");
        assert_eq!(h.name.as_deref(), Some("Ascot"));
    }

    #[test]
    fn wrong_shapes_read_as_absent() {
        let h: Holder = serde_json::from_value(json!({
            "name": {"first": "x"},
            "rung": "high",
            "rungs": "none"
        }))
        .expect("holder");
        assert!(h.name.is_none());
        assert!(h.rung.is_none());
        assert!(h.rungs.is_empty());
    }

    #[test]
    fn bad_list_entries_are_skipped() {
        let h: Holder = serde_json::from_value(json!({
            "rungs": [{"price": 2.0}, {"price": "lots"}, 7, {"price": 3.0}]
        }))
        .expect("holder");
        let prices: Vec<f64> = h.rungs.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![2.0, 3.0]);
    }

    #[test]
    fn missing_fields_default() {
        let h: Holder = serde_json::from_value(json!({})).expect("holder");
        assert!(h.name.is_none());
        assert!(h.rung.is_none());
        assert!(h.rungs.is_empty());
    }
}
