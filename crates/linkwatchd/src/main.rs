//! linkwatchd — the linkwatch daemon.
//!
//! Single binary that assembles the engine:
//! - Config + target registry
//! - History store
//! - HTTP prober + per-target scheduler
//! - Snapshot API
//!
//! # Usage
//!
//! ```text
//! linkwatchd --config /etc/linkwatch/linkwatch.toml --listen 0.0.0.0:8080
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use linkwatch_core::{LinkwatchConfig, Settings};
use linkwatch_health::{HttpProber, Scheduler};
use linkwatch_state::HistoryStore;

const DEFAULT_LOG_FILTER: &str = "info,linkwatchd=debug,linkwatch_health=debug";

#[derive(Parser)]
#[command(name = "linkwatchd", about = "linkwatch daemon", version)]
struct Cli {
    /// Path to the config file (.toml, or .json).
    #[arg(long, short, default_value = "linkwatch.toml")]
    config: PathBuf,

    /// Address for the API server; overrides `listen` in the config file.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = LinkwatchConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let mut settings = config.resolve().context("invalid configuration")?;
    if let Some(listen) = cli.listen {
        settings.listen = listen;
    }

    run(settings).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    info!(targets = settings.registry.len(), "linkwatch daemon starting");

    // ── Initialize subsystems ──────────────────────────────────

    let store = HistoryStore::new(settings.history_capacity)?;
    info!(capacity = store.capacity(), "history store initialized");

    let prober = HttpProber::new(settings.probe_timeout).context("failed to build HTTP prober")?;
    let scheduler = Scheduler::new(prober, store.clone(), settings.default_interval);
    scheduler.start(&settings.registry).await?;

    // ── Start API server ───────────────────────────────────────

    let router = linkwatch_api::build_router(store, settings.registry.clone());
    let listener = tokio::net::TcpListener::bind(settings.listen)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen))?;

    info!(addr = %settings.listen, "API server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop_all().await;

    info!("linkwatch daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
