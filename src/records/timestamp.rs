//! Timestamp wire format.
//!
//! Incoming values may be RFC 3339 with any offset, or naive ISO-8601 date-times taken
//! as UTC. Outgoing values are always UTC with exactly six fractional digits, so the
//! stored strings sort chronologically.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::{Map, Value};

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// A partial-update field that should hold a timestamp but does not.
#[derive(Debug, thiserror::Error)]
#[error("{field} is not a valid timestamp: {value}")]
pub struct InvalidTimestamp {
    pub field: String,
    pub value: Value,
}

/// Rewrite the listed keys of a partial document into the stored format. Absent keys
/// and `null` values are left as they are.
pub fn normalize_fields(
    fields: &mut Map<String, Value>,
    keys: &[&str],
) -> Result<(), InvalidTimestamp> {
    for key in keys {
        let Some(value) = fields.get_mut(*key) else {
            continue;
        };
        let parsed = match &*value {
            Value::Null => continue,
            Value::String(raw) => parse(raw).ok(),
            _ => None,
        };
        match parsed {
            Some(ts) => *value = Value::String(format(&ts)),
            None => {
                return Err(InvalidTimestamp {
                    field: (*key).to_string(),
                    value: value.clone(),
                })
            }
        }
    }
    Ok(())
}

/// Same format for `Option<DateTime<Utc>>`; pair with `#[serde(default)]`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_fixed_precision() {
        let whole = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format(&whole), "2026-01-02T03:04:05.000000Z");
    }

    #[test]
    fn parses_offsets_and_naive_values() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse("2026-01-02T03:04:05Z").unwrap(), expected);
        assert_eq!(parse("2026-01-02T04:04:05+01:00").unwrap(), expected);
        assert_eq!(parse("2026-01-02T03:04:05").unwrap(), expected);
        assert!(parse("yesterday").is_err());
    }

    #[test]
    fn formatted_values_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let later = earlier + chrono::Duration::milliseconds(500);
        assert!(format(&earlier) < format(&later));
    }

    #[test]
    fn normalizes_listed_fields_only() {
        let mut fields = serde_json::json!({
            "created_at": "2026-01-03T12:00:00+05:00",
            "due_date": null,
            "title": "2026-01-03T12:00:00+05:00",
        });
        let map = fields.as_object_mut().unwrap();
        normalize_fields(map, &["created_at", "due_date", "updated_at"]).unwrap();
        assert_eq!(map["created_at"], "2026-01-03T07:00:00.000000Z");
        assert_eq!(map["due_date"], Value::Null);
        assert_eq!(map["title"], "2026-01-03T12:00:00+05:00");
        assert!(!map.contains_key("updated_at"));
    }

    #[test]
    fn rejects_unparseable_fields() {
        let mut fields = serde_json::json!({"due_date": 42});
        let err = normalize_fields(fields.as_object_mut().unwrap(), &["due_date"]).unwrap_err();
        assert_eq!(err.field, "due_date");
        assert_eq!(err.to_string(), "due_date is not a valid timestamp: 42");
    }
}
