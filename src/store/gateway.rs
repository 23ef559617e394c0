//! Store gateway
//!
//! The single point of access to the store. Holds one backend handle for the
//! process lifetime and runs every statement under an [`ExecutionWindow`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{HeavyPayload, HeavyRecord, LightData, LightRecord};

use super::backend::RecordBackend;
use super::errors::{StoreError, StoreResult};

/// Fixed time budget for one store operation, measured from when it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionWindow(Duration);

impl ExecutionWindow {
    pub const DEFAULT: ExecutionWindow = ExecutionWindow(Duration::from_secs(2));

    pub fn new(limit: Duration) -> Self {
        Self(limit)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn limit(&self) -> Duration {
        self.0
    }

    /// Run `op` to completion or until the window elapses.
    ///
    /// On expiry the future is dropped, which abandons the in-flight call.
    pub async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.0, op).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::timeout(self.0)),
        }
    }
}

impl Default for ExecutionWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Shared gateway handed to every operation handler
#[derive(Clone)]
pub struct StoreGateway {
    backend: Arc<dyn RecordBackend>,
    window: ExecutionWindow,
}

impl StoreGateway {
    pub fn new(backend: impl RecordBackend + 'static) -> Self {
        Self::with_window(backend, ExecutionWindow::DEFAULT)
    }

    pub fn with_window(backend: impl RecordBackend + 'static, window: ExecutionWindow) -> Self {
        Self::from_shared(Arc::new(backend), window)
    }

    pub fn from_shared(backend: Arc<dyn RecordBackend>, window: ExecutionWindow) -> Self {
        Self { backend, window }
    }

    pub fn window(&self) -> ExecutionWindow {
        self.window
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.window.run(self.backend.ping()).await
    }

    /// Look up the first light record with `key`. `Ok(None)` means no row.
    pub async fn get_light(&self, key: &str) -> StoreResult<Option<LightRecord>> {
        self.window.run(self.backend.get_light(key)).await
    }

    pub async fn put_light(&self, data: LightData) -> StoreResult<LightRecord> {
        self.window.run(self.backend.put_light(data)).await
    }

    /// Look up a heavy record by id. `Ok(None)` means no row.
    pub async fn get_heavy(&self, id: i64) -> StoreResult<Option<HeavyRecord>> {
        self.window.run(self.backend.get_heavy(id)).await
    }

    pub async fn put_heavy(&self, payload: HeavyPayload) -> StoreResult<HeavyRecord> {
        self.window.run(self.backend.put_heavy(payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryBackend;

    #[tokio::test]
    async fn test_window_passes_through_result() {
        let window = ExecutionWindow::from_millis(100);
        let value = window.run(async { Ok::<_, StoreError>(5) }).await.unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_window_expiry_is_timeout() {
        let window = ExecutionWindow::from_millis(10);
        let err = window
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_window_keeps_backend_error() {
        let window = ExecutionWindow::default();
        let err = window
            .run(async { Err::<(), _>(StoreError::statement_failed("boom")) })
            .await
            .unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_default_window_is_two_seconds() {
        assert_eq!(ExecutionWindow::default().limit(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_gateway_light_roundtrip() {
        let gateway = StoreGateway::new(InMemoryBackend::new());
        let written = gateway.put_light(LightData::new("k", "v")).await.unwrap();
        let read = gateway.get_light("k").await.unwrap().unwrap();
        assert_eq!(written, read);
        assert!(gateway.get_light("missing").await.unwrap().is_none());
    }
}
