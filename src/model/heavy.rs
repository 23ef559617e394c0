//! Heavy records: opaque JSON blobs plus an ordered tag list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::{ModelError, ModelResult};
use super::opaque::OpaqueJson;

/// Request body for the heavy parse/write operations
///
/// The three documents are required. `tags` may be absent or `null`, in which
/// case it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeavyPayload {
    pub payload: OpaqueJson,
    pub metadata: OpaqueJson,
    pub nested_array: OpaqueJson,
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,
}

fn nullable_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl HeavyPayload {
    /// Decode a request body, validating the syntax of every opaque document.
    pub fn from_json(body: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(body).map_err(|e| ModelError::malformed("heavy", e))
    }

    /// Total size of the opaque documents in bytes
    pub fn document_bytes(&self) -> usize {
        self.payload.len() + self.metadata.len() + self.nested_array.len()
    }
}

/// A `heavy_data` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeavyRecord {
    pub id: i64,
    pub payload: OpaqueJson,
    pub metadata: OpaqueJson,
    pub nested_array: OpaqueJson,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HeavyRecord {
    pub fn from_insert(
        payload: HeavyPayload,
        id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            payload: payload.payload,
            metadata: payload.metadata,
            nested_array: payload.nested_array,
            tags: payload.tags,
            created_at,
            updated_at,
        }
    }
}
