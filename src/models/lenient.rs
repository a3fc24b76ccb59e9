//! Never-failing field readers for documents written by older page versions.
//!
//! Stored documents drift in shape (numbers saved as strings, dates saved as
//! epoch millis or bare dates). These helpers are used with
//! `#[serde(default, deserialize_with = "...")]` so a single odd field never
//! rejects a whole record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{Map, Value};

/// `(legacy key, canonical key)` pairs.
pub type LegacyKeys = &'static [(&'static str, &'static str)];

/// Move legacy keys onto their canonical names. A canonical value that is
/// present and non-null wins; the legacy key is always removed.
pub fn fold_legacy_keys(doc: &mut Map<String, Value>, keys: &[(&str, &str)]) {
    for (legacy, canonical) in keys {
        if let Some(value) = doc.remove(*legacy) {
            if doc.get(*canonical).map_or(true, Value::is_null) {
                doc.insert(canonical.to_string(), value);
            }
        }
    }
}

/// Read view over a stored document.
pub trait Record: DeserializeOwned + Default {
    const LEGACY_KEYS: LegacyKeys = &[];

    /// Never fails: an unreadable document becomes the empty view.
    fn from_document(mut doc: Map<String, Value>) -> Self {
        fold_legacy_keys(&mut doc, Self::LEGACY_KEYS);
        serde_json::from_value(Value::Object(doc)).unwrap_or_else(|e| {
            tracing::warn!("Unreadable document: {e}");
            Self::default()
        })
    }
}

pub fn to_amount(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

pub fn to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        // Extended JSON: { "$date": ... }
        Value::Object(map) => map.get("$date").and_then(to_timestamp),
        _ => None,
    }
}

pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(to_amount(&Value::deserialize(d)?))
}

pub fn optional_amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Null => None,
        other => Some(to_amount(&other)),
    })
}

pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(to_timestamp(&Value::deserialize(d)?))
}

pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(to_text(&Value::deserialize(d)?))
}

pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim(), "true" | "on" | "yes" | "1"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

pub fn quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = to_amount(&Value::deserialize(d)?);
    Ok(if n >= 1.0 { n.min(u32::MAX as f64) as u32 } else { 0 })
}

/// Object elements are read as records; anything else, or a non-array, is dropped.
pub fn records<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Record,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(doc) => Some(T::from_document(doc)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_keys_fill_only_missing_canonical_fields() {
        let keys = [("joinDate", "joined_at"), ("createdAt", "created_at")];
        let mut doc = json!({
            "joined_at": null,
            "joinDate": "2020-01-01",
            "created_at": "2024-05-01T00:00:00Z",
            "createdAt": "1999-01-01"
        })
        .as_object()
        .cloned()
        .unwrap();
        fold_legacy_keys(&mut doc, &keys);
        assert_eq!(doc["joined_at"], "2020-01-01");
        assert_eq!(doc["created_at"], "2024-05-01T00:00:00Z");
        assert!(!doc.contains_key("joinDate"));
        assert!(!doc.contains_key("createdAt"));
    }

    #[test]
    fn amounts_accept_numbers_and_numeric_strings() {
        assert_eq!(to_amount(&json!(100)), 100.0);
        assert_eq!(to_amount(&json!(12.5)), 12.5);
        assert_eq!(to_amount(&json!("1,250.50")), 1250.5);
        assert_eq!(to_amount(&json!("abc")), 0.0);
        assert_eq!(to_amount(&json!(null)), 0.0);
    }

    #[test]
    fn timestamps_accept_several_encodings() {
        let expected = DateTime::parse_from_rfc3339("2025-03-04T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(to_timestamp(&json!("2025-03-04T00:00:00Z")), Some(expected));
        assert_eq!(to_timestamp(&json!("2025-03-04")), Some(expected));
        assert_eq!(
            to_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(
            to_timestamp(&json!({ "$date": "2025-03-04T00:00:00Z" })),
            Some(expected)
        );
        assert_eq!(to_timestamp(&json!("yesterday")), None);
    }
}
