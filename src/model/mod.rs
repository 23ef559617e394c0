//! Record model for the benchmark workloads
//!
//! Two input shapes (`LightData`, `HeavyPayload`) and the two persisted shapes
//! returned by the store (`LightRecord`, `HeavyRecord`). Field names are part of
//! the wire contract and must not change.
//!
//! The heavy payload's `payload`, `metadata` and `nested_array` fields are
//! [`OpaqueJson`]: checked for JSON syntax on the way in and re-emitted byte for
//! byte on the way out. Their contents are never interpreted.

mod errors;
mod heavy;
mod light;
mod opaque;

pub use errors::{ModelError, ModelResult};
pub use heavy::{HeavyPayload, HeavyRecord};
pub use light::{LightData, LightRecord};
pub use opaque::OpaqueJson;
