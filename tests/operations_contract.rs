//! Operation Contract Tests
//!
//! Behaviour of the seven benchmark operations against the in-memory backend:
//! - write then read returns the written fields
//! - opaque documents round-trip byte for byte
//! - unknown keys/ids are NotFound
//! - parse operations never persist
//! - malformed input never reaches the store

use std::sync::Arc;

use stackbench::ops::{BenchOperations, OpError};
use stackbench::store::{ExecutionWindow, InMemoryBackend, RecordBackend, StoreGateway};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Arc<InMemoryBackend>, BenchOperations) {
    let backend = Arc::new(InMemoryBackend::new());
    let shared: Arc<dyn RecordBackend> = backend.clone();
    let gateway = StoreGateway::from_shared(shared, ExecutionWindow::DEFAULT);
    (backend, BenchOperations::new(gateway))
}

const HEAVY_BODY: &str = r#"{"payload":{"user":{"id":42,"name":"Ada","prefs":{"lang":"en","tz":"UTC","flags":[true,false]}},"items":[{"sku":"A-1","qty":2,"price":9.50}]},"metadata":{"trace":"abc","ts":1700000000,"headers":{"ua":"bench","accept":["*/*"]}},"nested_array":[{"level":1,"data":{"foo":[1,2,3],"bar":{"k1":"v1","k2":"v2"}}},{"level":2,"data":{"numbers":[4,5],"obj":[{"x":1}]}}],"tags":["alpha","beta","gamma"]}"#;

// =============================================================================
// Light Records
// =============================================================================

#[tokio::test]
async fn test_write_then_read_light() {
    let (_backend, ops) = setup();

    let written = ops
        .write_light(br#"{"key":"k1","value":"v1"}"#)
        .await
        .unwrap();
    assert_eq!(written.key, "k1");
    assert_eq!(written.value, "v1");
    assert!(written.id > 0);
    assert!(written.created_at <= written.updated_at);

    let read = ops.read_light(Some("k1")).await.unwrap();
    assert_eq!(read, written);
}

#[tokio::test]
async fn test_read_unknown_light_key_is_not_found() {
    let (_backend, ops) = setup();
    ops.write_light(br#"{"key":"present","value":"v"}"#)
        .await
        .unwrap();

    let err = ops.read_light(Some("never-written")).await.unwrap_err();
    assert_eq!(err, OpError::NotFound("light"));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_light_ids_increase() {
    let (_backend, ops) = setup();
    let mut last = 0;
    for i in 0..5 {
        let body = format!(r#"{{"key":"k{}","value":"v"}}"#, i);
        let record = ops.write_light(body.as_bytes()).await.unwrap();
        assert!(record.id > last);
        last = record.id;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_get_distinct_ids() {
    let (backend, ops) = setup();
    let mut tasks = Vec::new();

    for i in 0..32 {
        let ops = ops.clone();
        tasks.push(tokio::spawn(async move {
            let light = format!(r#"{{"key":"c{}","value":"v{}"}}"#, i, i);
            let heavy = format!(
                r#"{{"payload":{{"n":{}}},"metadata":{{}},"nested_array":[],"tags":["t{}"]}}"#,
                i, i
            );
            let light = ops.write_light(light.as_bytes()).await.unwrap();
            let heavy = ops.write_heavy(heavy.as_bytes()).await.unwrap();
            (i, light, heavy)
        }));
    }

    let mut light_ids = std::collections::HashSet::new();
    let mut heavy_ids = std::collections::HashSet::new();
    for task in tasks {
        let (i, light, heavy) = task.await.unwrap();
        assert!(light_ids.insert(light.id));
        assert!(heavy_ids.insert(heavy.id));

        let read = ops.read_light(Some(&format!("c{}", i))).await.unwrap();
        assert_eq!(read, light);
        let read = ops.read_heavy(Some(heavy.id)).await.unwrap();
        assert_eq!(read.payload.as_str(), format!(r#"{{"n":{}}}"#, i));
        assert_eq!(read.tags, vec![format!("t{}", i)]);
    }

    assert_eq!(backend.light_len(), 32);
    assert_eq!(backend.heavy_len(), 32);
}

// =============================================================================
// Heavy Records
// =============================================================================

#[tokio::test]
async fn test_write_then_read_heavy_is_byte_identical() {
    let (_backend, ops) = setup();

    let written = ops.write_heavy(HEAVY_BODY.as_bytes()).await.unwrap();
    let read = ops.read_heavy(Some(written.id)).await.unwrap();

    assert_eq!(read.payload.as_str(), written.payload.as_str());
    assert_eq!(read.metadata.as_str(), written.metadata.as_str());
    assert_eq!(read.nested_array.as_str(), written.nested_array.as_str());
    // a parsed tree would print 9.5
    assert!(read.payload.as_str().contains(r#""price":9.50"#));
    assert!(HEAVY_BODY.contains(read.nested_array.as_str()));
    assert_eq!(read.tags, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn test_heavy_whitespace_and_key_order_preserved() {
    let (_backend, ops) = setup();
    let body = br#"{"payload": {"z": 1,  "a": [ 1, 2 ]}, "metadata": {"b":true,"a":null}, "nested_array": [ ]}"#;

    let written = ops.write_heavy(body).await.unwrap();
    let read = ops.read_heavy(Some(written.id)).await.unwrap();

    assert_eq!(read.payload.as_str(), r#"{"z": 1,  "a": [ 1, 2 ]}"#);
    assert_eq!(read.metadata.as_str(), r#"{"b":true,"a":null}"#);
    assert_eq!(read.nested_array.as_str(), "[ ]");
    assert!(read.tags.is_empty());
}

#[tokio::test]
async fn test_read_unknown_heavy_id_is_not_found() {
    let (_backend, ops) = setup();
    let err = ops.read_heavy(Some(999_999)).await.unwrap_err();
    assert_eq!(err, OpError::NotFound("heavy"));
}

// =============================================================================
// Parse-only Operations
// =============================================================================

#[tokio::test]
async fn test_parse_operations_never_persist() {
    let (backend, ops) = setup();

    for _ in 0..10 {
        ops.parse_light(br#"{"key":"key_1","value":"v"}"#).unwrap();
        ops.parse_heavy(HEAVY_BODY.as_bytes()).unwrap();
    }

    assert_eq!(backend.statement_count(), 0);
    assert_eq!(ops.read_light(Some("key_1")).await.unwrap_err().status_code(), 404);
    assert_eq!(ops.read_heavy(Some(1)).await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn test_parse_heavy_accepts_what_write_accepts() {
    let (_backend, ops) = setup();
    let body = br#"{"payload":null,"metadata":"text","nested_array":3}"#;
    assert!(ops.parse_heavy(body).unwrap().parsed);
    assert!(ops.write_heavy(body).await.is_ok());
}

// =============================================================================
// Malformed Input
// =============================================================================

#[tokio::test]
async fn test_malformed_bodies_never_touch_store() {
    let (backend, ops) = setup();
    let truncated = br#"{"key": "a""#;

    assert!(matches!(
        ops.parse_light(truncated),
        Err(OpError::MalformedInput(_))
    ));
    assert!(matches!(
        ops.parse_heavy(truncated),
        Err(OpError::MalformedInput(_))
    ));
    assert!(matches!(
        ops.write_light(truncated).await,
        Err(OpError::MalformedInput(_))
    ));
    assert!(matches!(
        ops.write_heavy(truncated).await,
        Err(OpError::MalformedInput(_))
    ));

    assert_eq!(backend.statement_count(), 0);
    assert_eq!(backend.light_len(), 0);
    assert_eq!(backend.heavy_len(), 0);
}

#[tokio::test]
async fn test_invalid_opaque_document_is_malformed() {
    let (backend, ops) = setup();
    let body = br#"{"payload":{"a":},"metadata":{},"nested_array":[]}"#;
    let err = ops.write_heavy(body).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(backend.statement_count(), 0);
}
