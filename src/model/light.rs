//! Light records: small flat key/value rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ModelError, ModelResult};

/// Request body for the light parse/write operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightData {
    pub key: String,
    pub value: String,
}

impl LightData {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Decode a request body. Both `key` and `value` are required; nothing
    /// else about them is checked.
    pub fn from_json(body: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(body).map_err(|e| ModelError::malformed("light", e))
    }
}

/// A `light_data` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightRecord {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LightRecord {
    /// Combine accepted input with the columns the store assigned on insert.
    pub fn from_insert(
        data: LightData,
        id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key: data.key,
            value: data.value,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_light_data() {
        let data = LightData::from_json(br#"{"key":"k1","value":"v1"}"#).unwrap();
        assert_eq!(data, LightData::new("k1", "v1"));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let data = LightData::from_json(br#"{"key":"k","value":"v","other":3}"#).unwrap();
        assert_eq!(data.key, "k");
    }

    #[test]
    fn test_missing_value_is_malformed() {
        let err = LightData::from_json(br#"{"key":"a"}"#).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { kind: "light", .. }));
    }

    #[test]
    fn test_truncated_body_is_malformed() {
        assert!(LightData::from_json(br#"{"key": "a""#).is_err());
        assert!(LightData::from_json(b"").is_err());
    }

    #[test]
    fn test_empty_strings_accepted() {
        let data = LightData::from_json(br#"{"key":"","value":""}"#).unwrap();
        assert!(data.key.is_empty());
    }

    #[test]
    fn test_record_wire_names() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = LightRecord::from_insert(LightData::new("k1", "v1"), 1, ts, ts);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["key"], "k1");
        assert_eq!(json["value"], "v1");
        assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");
        assert_eq!(json["updated_at"], "2024-01-01T00:00:00Z");
    }
}
