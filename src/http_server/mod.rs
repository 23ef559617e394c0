//! # HTTP Server Module
//!
//! Binds each benchmark operation to a method and path.
//!
//! # Endpoints
//!
//! - `GET /hello`
//! - `POST /parse_light`, `POST /parse_heavy`
//! - `GET /read_light_db?key=`, `POST /write_light_db`
//! - `GET /read_heavy_db?id=`, `POST /write_heavy_db`
//! - `GET /health`

pub mod bench_routes;
pub mod config;
pub mod observability_routes;
pub mod response;
pub mod server;

pub use config::HttpServerConfig;
pub use response::ErrorResponse;
pub use server::HttpServer;
