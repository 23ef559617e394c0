//! Benchmark request operations
//!
//! Seven stateless handlers. Each validates its input, calls the store gateway
//! when it needs persistence, and returns a payload or a classified
//! [`OpError`]. Validation always happens before any store interaction.

mod errors;
mod handlers;

pub use errors::{ErrorExposure, OpError, OpResult};
pub use handlers::{
    parse_heavy_id, BenchOperations, Parsed, DEFAULT_HEAVY_ID, DEFAULT_LIGHT_KEY, GREETING,
};
