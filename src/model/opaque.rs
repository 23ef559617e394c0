//! Opaque JSON pass-through values

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use super::errors::{ModelError, ModelResult};

/// A syntactically valid JSON document kept as its original text.
///
/// Never parsed into a tree, so key order, whitespace inside the document and
/// number formatting survive a store round trip unchanged.
#[derive(Clone)]
pub struct OpaqueJson(Box<RawValue>);

impl OpaqueJson {
    /// Validate `text` as JSON and take ownership of it.
    pub fn from_text(text: impl Into<String>) -> ModelResult<Self> {
        RawValue::from_string(text.into())
            .map(Self)
            .map_err(|e| ModelError::InvalidDocument(e.to_string()))
    }

    /// The document text exactly as received.
    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl PartialEq for OpaqueJson {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for OpaqueJson {}

impl fmt::Debug for OpaqueJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueJson").field(&self.as_str()).finish()
    }
}

impl fmt::Display for OpaqueJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OpaqueJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OpaqueJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(Self)
    }
}
