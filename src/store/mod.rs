//! Store gateway subsystem
//!
//! Everything that touches persisted records goes through [`StoreGateway`]:
//! - `RecordBackend` is the statement seam (Postgres or in-memory)
//! - `ExecutionWindow` bounds every call
//! - `PgHandle` + `PoolPolicy` make connection reuse an explicit setting

mod backend;
mod errors;
mod gateway;
mod memory;
mod pool;
mod postgres;

pub use backend::RecordBackend;
pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use gateway::{ExecutionWindow, StoreGateway};
pub use memory::InMemoryBackend;
pub use pool::{PgConn, PgHandle, PoolPolicy, PoolStats};
pub use postgres::PostgresBackend;
