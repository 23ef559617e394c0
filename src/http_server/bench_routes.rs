//! Benchmark HTTP Routes
//!
//! One route per benchmark operation. Bodies are taken as raw bytes so that
//! decode failures come back as 400 from the operation itself. Body size is
//! not capped here.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, DefaultBodyLimit, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::model::{HeavyRecord, LightRecord};
use crate::ops::{parse_heavy_id, BenchOperations, OpError, OpResult, Parsed};

type OpsState = Arc<BenchOperations>;

#[derive(Debug, Deserialize)]
pub struct ReadLightQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadHeavyQuery {
    pub id: Option<String>,
}

/// Query string failures use the same error body as every other 400.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> OpResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| OpError::MalformedInput(e.body_text()))
}

/// Create benchmark routes
pub fn bench_routes(ops: OpsState) -> Router {
    Router::new()
        .route("/hello", get(hello_handler))
        // JSON decoding only, no store
        .route("/parse_light", post(parse_light_handler))
        .route("/parse_heavy", post(parse_heavy_handler))
        // Light table
        .route("/read_light_db", get(read_light_handler))
        .route("/write_light_db", post(write_light_handler))
        // Heavy table
        .route("/read_heavy_db", get(read_heavy_handler))
        .route("/write_heavy_db", post(write_heavy_handler))
        .layer(DefaultBodyLimit::disable())
        .with_state(ops)
}

async fn hello_handler(State(ops): State<OpsState>) -> &'static str {
    ops.hello()
}

async fn parse_light_handler(
    State(ops): State<OpsState>,
    body: Bytes,
) -> Result<Json<Parsed>, OpError> {
    ops.parse_light(&body).map(Json)
}

async fn parse_heavy_handler(
    State(ops): State<OpsState>,
    body: Bytes,
) -> Result<Json<Parsed>, OpError> {
    ops.parse_heavy(&body).map(Json)
}

async fn read_light_handler(
    State(ops): State<OpsState>,
    query: Result<Query<ReadLightQuery>, QueryRejection>,
) -> Result<Json<LightRecord>, OpError> {
    let query = query_params(query)?;
    ops.read_light(query.key.as_deref()).await.map(Json)
}

async fn write_light_handler(
    State(ops): State<OpsState>,
    body: Bytes,
) -> Result<Json<LightRecord>, OpError> {
    ops.write_light(&body).await.map(Json)
}

async fn read_heavy_handler(
    State(ops): State<OpsState>,
    query: Result<Query<ReadHeavyQuery>, QueryRejection>,
) -> Result<Json<HeavyRecord>, OpError> {
    let query = query_params(query)?;
    let id = parse_heavy_id(query.id.as_deref())?;
    ops.read_heavy(Some(id)).await.map(Json)
}

async fn write_heavy_handler(
    State(ops): State<OpsState>,
    body: Bytes,
) -> Result<Json<HeavyRecord>, OpError> {
    ops.write_heavy(&body).await.map(Json)
}
