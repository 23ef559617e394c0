//! CLI argument definitions using clap
//!
//! Commands:
//! - stackbench serve [--config <path>] [--database-url <url>] [--host <host>] [--port <port>] [--store <kind>]
//! - stackbench ping  [--config <path>] [--database-url <url>]

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::StoreKind;

/// stackbench - HTTP micro-benchmark harness
#[derive(Parser, Debug)]
#[command(name = "stackbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that resolves a configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Postgres connection string (overrides DATABASE_URL and the config file)
    #[arg(long)]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    Postgres,
    Memory,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Postgres => StoreKind::Postgres,
            StoreArg::Memory => StoreKind::Memory,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the benchmark endpoints
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Record backend
        #[arg(long, value_enum)]
        store: Option<StoreArg>,
    },

    /// Open the store handle, run a liveness query and exit
    Ping {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "stackbench",
            "serve",
            "--port",
            "3001",
            "--store",
            "memory",
            "--database-url",
            "postgresql://localhost/x",
        ])
        .unwrap();
        match cli.command {
            Command::Serve {
                config,
                port,
                store,
                host,
            } => {
                assert_eq!(port, Some(3001));
                assert_eq!(store, Some(StoreArg::Memory));
                assert_eq!(host, None);
                assert_eq!(config.database_url.as_deref(), Some("postgresql://localhost/x"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ping() {
        let cli = Cli::try_parse_from(["stackbench", "ping", "--config", "bench.json"]).unwrap();
        assert!(matches!(cli.command, Command::Ping { .. }));
    }

    #[test]
    fn test_rejects_unknown_store() {
        assert!(Cli::try_parse_from(["stackbench", "serve", "--store", "redis"]).is_err());
    }
}
