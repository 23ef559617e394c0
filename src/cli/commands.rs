//! CLI command implementations
//!
//! Bootstrap order for `serve`:
//! 1. Load `.env` if present, then resolve configuration
//!    (flags > DATABASE_URL > file > defaults), validating once at the end
//! 2. Construct the store gateway (one handle for the process lifetime)
//! 3. Ping the store; failure is logged and serving continues
//! 4. Bind and serve until Ctrl-C

use std::sync::Arc;

use crate::config::{BenchConfig, StoreKind, DATABASE_URL_ENV};
use crate::http_server::HttpServer;
use crate::observability;
use crate::ops::BenchOperations;
use crate::store::{InMemoryBackend, PostgresBackend, RecordBackend, StoreGateway};

use super::args::{Cli, Command, ConfigArgs, StoreArg};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(command: Command) -> CliResult<()> {
    let dotenv = dotenvy::dotenv();
    observability::init_tracing();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }
    let env_url = std::env::var(DATABASE_URL_ENV).ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        Command::Serve {
            config,
            host,
            port,
            store,
        } => {
            let config = resolve_serve_config(&config, env_url, host, port, store)?;
            runtime.block_on(serve(config))
        }
        Command::Ping { config } => {
            let config = resolve_config(&config, env_url)?;
            runtime.block_on(ping(config))
        }
    }
}

/// Build and validate the effective configuration for a command
pub fn resolve_config(args: &ConfigArgs, env_url: Option<String>) -> CliResult<BenchConfig> {
    let config = layered_config(args, env_url)?;
    config.validate()?;
    Ok(config)
}

/// File, then environment, then flags. No validation.
fn layered_config(args: &ConfigArgs, env_url: Option<String>) -> CliResult<BenchConfig> {
    let config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    let mut config = config.with_env_database_url(env_url);
    if let Some(url) = &args.database_url {
        config.database_url = Some(url.clone());
    }
    Ok(config)
}

fn resolve_serve_config(
    args: &ConfigArgs,
    env_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    store: Option<StoreArg>,
) -> CliResult<BenchConfig> {
    let mut config = layered_config(args, env_url)?;
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }
    if let Some(store) = store {
        config.store.kind = store.into();
    }
    config.validate()?;
    Ok(config)
}

/// Construct the one store gateway the process will use
pub fn build_gateway(config: &BenchConfig) -> CliResult<StoreGateway> {
    let backend: Arc<dyn RecordBackend> = match config.store.kind {
        StoreKind::Memory => Arc::new(InMemoryBackend::new()),
        StoreKind::Postgres => {
            let backend =
                PostgresBackend::connect_lazy(config.database_url(), config.store.pool.policy())?;
            let policy = backend.handle().policy();
            tracing::info!(
                max_open = ?policy.max_open,
                max_idle = policy.max_idle,
                max_lifetime = ?policy.max_lifetime,
                reuse = policy.reuses_connections(),
                "postgres connection policy"
            );
            Arc::new(backend)
        }
    };
    Ok(StoreGateway::from_shared(
        backend,
        config.store.execution_window(),
    ))
}

async fn serve(config: BenchConfig) -> CliResult<()> {
    let gateway = build_gateway(&config)?;
    let window_ms = gateway.window().limit().as_millis() as u64;
    tracing::info!(
        store = gateway.backend_kind(),
        window_ms,
        exposure = ?config.error_exposure(),
        "store gateway ready"
    );

    if let Err(e) = gateway.ping().await {
        tracing::error!(code = %e.code(), error = %e, "store ping failed, serving anyway");
    }

    let ops = BenchOperations::with_exposure(gateway, config.error_exposure());
    HttpServer::new(config.http.clone(), ops)
        .start()
        .await
        .map_err(|e| CliError::boot_failed(e.to_string()))
}

async fn ping(config: BenchConfig) -> CliResult<()> {
    let gateway = build_gateway(&config)?;
    gateway.ping().await?;
    println!("{} store reachable", gateway.backend_kind());
    Ok(())
}
