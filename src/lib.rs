//! stackbench - HTTP micro-benchmark harness
//!
//! Benchmark operations over light and heavy records:
//! - `model`: request and record shapes
//! - `store`: the store gateway, backends and connection policy
//! - `ops`: the operation handlers and their error classification
//! - `http_server`: method/path binding

pub mod cli;
pub mod config;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod ops;
pub mod store;
