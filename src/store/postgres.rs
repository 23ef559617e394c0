//! Postgres record backend
//!
//! Parameterised statements only. Opaque documents cross the wire as text and
//! are cast to `json` by the server; reading them back with `::text` is
//! byte-identical as long as the columns are `json` rather than `jsonb`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

use crate::model::{HeavyPayload, HeavyRecord, LightData, LightRecord, OpaqueJson};

use super::backend::RecordBackend;
use super::errors::{StoreError, StoreResult};
use super::pool::{PgConn, PgHandle, PoolPolicy, PoolStats};

const PING: &str = "SELECT 1";

const SELECT_LIGHT: &str = "SELECT id::bigint, key, value, created_at, updated_at \
     FROM light_data WHERE key = $1 LIMIT 1";

const INSERT_LIGHT: &str = "INSERT INTO light_data (key, value) VALUES ($1, $2) \
     RETURNING id::bigint, created_at, updated_at";

const SELECT_HEAVY: &str = "SELECT id::bigint, payload::text, metadata::text, nested_array::text, \
     tags, created_at, updated_at FROM heavy_data WHERE id = $1::bigint";

const INSERT_HEAVY: &str = "INSERT INTO heavy_data (payload, metadata, nested_array, tags) \
     VALUES ($1::text::json, $2::text::json, $3::text::json, $4::text[]) \
     RETURNING id::bigint, created_at, updated_at";

/// Backend over a single [`PgHandle`]
pub struct PostgresBackend {
    handle: PgHandle,
}

impl PostgresBackend {
    pub fn new(handle: PgHandle) -> Self {
        Self { handle }
    }

    pub fn connect_lazy(database_url: &str, policy: PoolPolicy) -> StoreResult<Self> {
        Ok(Self::new(PgHandle::new(database_url, policy)?))
    }

    pub fn stats(&self) -> PoolStats {
        self.handle.stats()
    }

    pub fn handle(&self) -> &PgHandle {
        &self.handle
    }
}

fn column<'r, T: FromSql<'r>>(row: &'r Row, idx: usize) -> StoreResult<T> {
    row.try_get(idx)
        .map_err(|e| StoreError::decode_failed(e.to_string()))
}

fn document(row: &Row, idx: usize) -> StoreResult<OpaqueJson> {
    let text: String = column(row, idx)?;
    OpaqueJson::from_text(text).map_err(|e| StoreError::decode_failed(e.to_string()))
}

fn assigned(row: &Row) -> StoreResult<(i64, DateTime<Utc>, DateTime<Utc>)> {
    Ok((column(row, 0)?, column(row, 1)?, column(row, 2)?))
}

/// Hand the connection back according to how the statement ended.
fn settle<T>(conn: PgConn<'_>, result: Result<T, tokio_postgres::Error>) -> StoreResult<T> {
    match result {
        Ok(value) => {
            conn.release();
            Ok(value)
        }
        Err(e) => {
            conn.fail();
            Err(StoreError::from(e))
        }
    }
}

#[async_trait]
impl RecordBackend for PostgresBackend {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        let conn = self.handle.acquire().await?;
        let result = conn.client()?.simple_query(PING).await;
        settle(conn, result).map(|_| ())
    }

    async fn get_light(&self, key: &str) -> StoreResult<Option<LightRecord>> {
        let conn = self.handle.acquire().await?;
        let result = conn.client()?.query_opt(SELECT_LIGHT, &[&key]).await;
        let Some(row) = settle(conn, result)? else {
            return Ok(None);
        };
        Ok(Some(LightRecord {
            id: column(&row, 0)?,
            key: column(&row, 1)?,
            value: column(&row, 2)?,
            created_at: column(&row, 3)?,
            updated_at: column(&row, 4)?,
        }))
    }

    async fn put_light(&self, data: LightData) -> StoreResult<LightRecord> {
        let conn = self.handle.acquire().await?;
        let result = conn
            .client()?
            .query_one(INSERT_LIGHT, &[&data.key, &data.value])
            .await;
        let row = settle(conn, result)?;
        let (id, created_at, updated_at) = assigned(&row)?;
        Ok(LightRecord::from_insert(data, id, created_at, updated_at))
    }

    async fn get_heavy(&self, id: i64) -> StoreResult<Option<HeavyRecord>> {
        let conn = self.handle.acquire().await?;
        let result = conn.client()?.query_opt(SELECT_HEAVY, &[&id]).await;
        let Some(row) = settle(conn, result)? else {
            return Ok(None);
        };
        let tags: Option<Vec<String>> = column(&row, 4)?;
        Ok(Some(HeavyRecord {
            id: column(&row, 0)?,
            payload: document(&row, 1)?,
            metadata: document(&row, 2)?,
            nested_array: document(&row, 3)?,
            tags: tags.unwrap_or_default(),
            created_at: column(&row, 5)?,
            updated_at: column(&row, 6)?,
        }))
    }

    async fn put_heavy(&self, payload: HeavyPayload) -> StoreResult<HeavyRecord> {
        let conn = self.handle.acquire().await?;
        let result = conn
            .client()?
            .query_one(
                INSERT_HEAVY,
                &[
                    &payload.payload.as_str(),
                    &payload.metadata.as_str(),
                    &payload.nested_array.as_str(),
                    &payload.tags,
                ],
            )
            .await;
        let row = settle(conn, result)?;
        let (id, created_at, updated_at) = assigned(&row)?;
        Ok(HeavyRecord::from_insert(payload, id, created_at, updated_at))
    }
}
