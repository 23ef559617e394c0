//! In-process record backend
//!
//! Used by tests and by `store.kind = "memory"` to benchmark the HTTP stack
//! without a database. Each table has its own id sequence starting at 1.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::model::{HeavyPayload, HeavyRecord, LightData, LightRecord};

use super::backend::RecordBackend;
use super::errors::StoreResult;

#[derive(Default)]
struct Tables {
    light: Vec<LightRecord>,
    heavy: Vec<HeavyRecord>,
}

/// Backend holding both tables in memory
#[derive(Default)]
pub struct InMemoryBackend {
    tables: RwLock<Tables>,
    statements: AtomicU64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements executed so far (pings excluded)
    pub fn statement_count(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    pub fn light_len(&self) -> usize {
        self.tables.read().light.len()
    }

    pub fn heavy_len(&self) -> usize {
        self.tables.read().heavy.len()
    }

    fn count(&self) {
        self.statements.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl RecordBackend for InMemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_light(&self, key: &str) -> StoreResult<Option<LightRecord>> {
        self.count();
        let tables = self.tables.read();
        Ok(tables.light.iter().find(|r| r.key == key).cloned())
    }

    async fn put_light(&self, data: LightData) -> StoreResult<LightRecord> {
        self.count();
        let now = Utc::now();
        let mut tables = self.tables.write();
        let id = tables.light.len() as i64 + 1;
        let record = LightRecord::from_insert(data, id, now, now);
        tables.light.push(record.clone());
        Ok(record)
    }

    async fn get_heavy(&self, id: i64) -> StoreResult<Option<HeavyRecord>> {
        self.count();
        let tables = self.tables.read();
        // ids are dense and 1-based
        let found = usize::try_from(id)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| tables.heavy.get(i))
            .cloned();
        Ok(found)
    }

    async fn put_heavy(&self, payload: HeavyPayload) -> StoreResult<HeavyRecord> {
        self.count();
        let now = Utc::now();
        let mut tables = self.tables.write();
        let id = tables.heavy.len() as i64 + 1;
        let record = HeavyRecord::from_insert(payload, id, now, now);
        tables.heavy.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heavy(tags: &[&str]) -> HeavyPayload {
        let body = serde_json::json!({
            "payload": {"n": 1},
            "metadata": {},
            "nested_array": [],
            "tags": tags,
        });
        HeavyPayload::from_json(body.to_string().as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let backend = InMemoryBackend::new();
        let a = backend.put_light(LightData::new("a", "1")).await.unwrap();
        let b = backend.put_light(LightData::new("b", "2")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.created_at <= a.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_key_returns_first() {
        let backend = InMemoryBackend::new();
        backend.put_light(LightData::new("dup", "first")).await.unwrap();
        backend.put_light(LightData::new("dup", "second")).await.unwrap();
        let found = backend.get_light("dup").await.unwrap().unwrap();
        assert_eq!(found.value, "first");
    }

    #[tokio::test]
    async fn test_heavy_lookup_by_id() {
        let backend = InMemoryBackend::new();
        let written = backend.put_heavy(heavy(&["x", "y"])).await.unwrap();
        assert_eq!(backend.get_heavy(written.id).await.unwrap(), Some(written));
        assert_eq!(backend.get_heavy(0).await.unwrap(), None);
        assert_eq!(backend.get_heavy(-4).await.unwrap(), None);
        assert_eq!(backend.get_heavy(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_statement_counter() {
        let backend = InMemoryBackend::new();
        backend.ping().await.unwrap();
        backend.get_light("k").await.unwrap();
        assert_eq!(backend.statement_count(), 1);
    }
}
