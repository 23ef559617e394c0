//! CLI module for stackbench
//!
//! Provides command-line interface for:
//! - serve: resolve config, build the store gateway, serve HTTP
//! - ping: check that the configured store answers

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, ConfigArgs, StoreArg};
pub use commands::{build_gateway, resolve_config, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
