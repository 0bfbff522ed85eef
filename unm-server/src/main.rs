//! unm-server - HTTP host for the song resolver
//!
//! Loads configuration, registers the built-in engines and serves the
//! JSON API until interrupted.

use anyhow::{Context as _, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use unm_common::config::TomlConfig;
use unm_engine::engines::default_registry;
use unm_engine::Executor;
use unm_server::{bind_listener, build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "unm-server", version, about = "Resolve songs to playable URLs over HTTP")]
struct Args {
    /// Configuration file (overrides UNM_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides configuration and UNM_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level or filter directive (overrides configuration; RUST_LOG wins over both)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_status) = TomlConfig::load(args.config)?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, config.logging.log_file.as_deref())?;

    info!(
        "Starting unm-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Loading ran before the subscriber existed
    config_status.log();

    let executor = Executor::new(default_registry());
    info!(engines = ?executor.list(), "Engines registered");
    if let Some(engines) = &config.engines {
        info!(?engines, "Default engine list");
    }

    let rate_limit = config.server.rate_limit;
    if rate_limit.is_enabled() {
        info!(requests = rate_limit.requests, per_secs = rate_limit.per_secs, "API rate limit");
    } else {
        info!("API rate limit disabled");
    }

    let bind_address = args.bind.unwrap_or_else(|| config.server.bind_address.clone());
    let state = AppState::from_config(executor, &config);
    let app = build_router(state);

    let (listener, local_addr) = bind_listener(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {bind_address}"))?;
    info!("unm-server listening on http://{}", local_addr);
    info!("Health check: http://{}/health", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("unm-server stopped");
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. With `log_file` set, output
/// goes to that file (appended, no ANSI colours) instead of stdout.
fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {level}"))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Arc::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
