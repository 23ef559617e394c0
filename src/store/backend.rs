//! Store backend trait
//!
//! A backend executes the four record statements against some store. It does
//! not enforce deadlines; [`StoreGateway`](super::StoreGateway) wraps every call
//! in the execution window.

use async_trait::async_trait;

use crate::model::{HeavyPayload, HeavyRecord, LightData, LightRecord};

use super::errors::StoreResult;

/// Record statements against a relational store
///
/// Implementations must be safe to call concurrently without external locking.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Short backend name for logs
    fn kind(&self) -> &'static str;

    /// Liveness check
    async fn ping(&self) -> StoreResult<()>;

    /// First light row whose key equals `key`, if any
    async fn get_light(&self, key: &str) -> StoreResult<Option<LightRecord>>;

    /// Insert a light row and return it with the store-assigned columns
    async fn put_light(&self, data: LightData) -> StoreResult<LightRecord>;

    /// Heavy row with the given id, if any
    async fn get_heavy(&self, id: i64) -> StoreResult<Option<HeavyRecord>>;

    /// Insert a heavy row and return it with the store-assigned columns
    async fn put_heavy(&self, payload: HeavyPayload) -> StoreResult<HeavyRecord>;
}
