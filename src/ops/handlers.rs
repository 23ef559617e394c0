//! Operation handlers

use std::hint::black_box;

use serde::{Deserialize, Serialize};

use crate::model::{HeavyPayload, HeavyRecord, LightData, LightRecord};
use crate::store::{StoreError, StoreGateway};

use super::errors::{ErrorExposure, OpError, OpResult};

pub const GREETING: &str = "hello world";
pub const DEFAULT_LIGHT_KEY: &str = "key_1";
pub const DEFAULT_HEAVY_ID: i64 = 1;

/// Response of the parse-only operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parsed {
    pub parsed: bool,
}

/// Parse the `id` query parameter of read-heavy.
pub fn parse_heavy_id(raw: Option<&str>) -> OpResult<i64> {
    match raw {
        None => Ok(DEFAULT_HEAVY_ID),
        Some(text) => text
            .parse::<i64>()
            .map_err(|_| OpError::MalformedInput(format!("invalid id query parameter: {:?}", text))),
    }
}

/// The benchmark operations bound to one store gateway
#[derive(Clone)]
pub struct BenchOperations {
    gateway: StoreGateway,
    exposure: ErrorExposure,
}

impl BenchOperations {
    pub fn new(gateway: StoreGateway) -> Self {
        Self::with_exposure(gateway, ErrorExposure::default())
    }

    pub fn with_exposure(gateway: StoreGateway, exposure: ErrorExposure) -> Self {
        Self { gateway, exposure }
    }

    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    pub fn exposure(&self) -> ErrorExposure {
        self.exposure
    }

    /// hello-echo
    pub fn hello(&self) -> &'static str {
        GREETING
    }

    /// parse-light: full decode, then discard
    pub fn parse_light(&self, body: &[u8]) -> OpResult<Parsed> {
        black_box(LightData::from_json(body)?);
        Ok(Parsed { parsed: true })
    }

    /// parse-heavy: full decode, then discard
    pub fn parse_heavy(&self, body: &[u8]) -> OpResult<Parsed> {
        black_box(HeavyPayload::from_json(body)?);
        Ok(Parsed { parsed: true })
    }

    /// read-light; `key` defaults to `key_1`
    pub async fn read_light(&self, key: Option<&str>) -> OpResult<LightRecord> {
        let key = key.unwrap_or(DEFAULT_LIGHT_KEY);
        self.gateway
            .get_light(key)
            .await
            .map_err(|e| self.store_failure("read_light", e))?
            .ok_or(OpError::NotFound("light"))
    }

    /// write-light
    pub async fn write_light(&self, body: &[u8]) -> OpResult<LightRecord> {
        let data = LightData::from_json(body)?;
        self.gateway
            .put_light(data)
            .await
            .map_err(|e| self.store_failure("write_light", e))
    }

    /// read-heavy; `id` defaults to 1
    pub async fn read_heavy(&self, id: Option<i64>) -> OpResult<HeavyRecord> {
        let id = id.unwrap_or(DEFAULT_HEAVY_ID);
        self.gateway
            .get_heavy(id)
            .await
            .map_err(|e| self.store_failure("read_heavy", e))?
            .ok_or(OpError::NotFound("heavy"))
    }

    /// write-heavy
    pub async fn write_heavy(&self, body: &[u8]) -> OpResult<HeavyRecord> {
        let payload = HeavyPayload::from_json(body)?;
        tracing::trace!(
            document_bytes = payload.document_bytes(),
            tags = payload.tags.len(),
            "writing heavy record"
        );
        self.gateway
            .put_heavy(payload)
            .await
            .map_err(|e| self.store_failure("write_heavy", e))
    }

    fn store_failure(&self, operation: &'static str, err: StoreError) -> OpError {
        if err.is_timeout() {
            tracing::warn!(operation, code = %err.code(), error = %err, "store operation timed out");
        } else {
            tracing::error!(operation, code = %err.code(), error = %err, "store operation failed");
        }
        self.exposure.apply(&err)
    }
}
