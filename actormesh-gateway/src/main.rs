//! Gateway binary: the platform's control plane.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Layer 3: Internal module imports
use actormesh_core::{EventBus, SharedSecret};
use actormesh_gateway::{
    router, AppState, GatewayConfig, GatewayMetrics, HealthMonitor,
};
use actormesh_gateway::registry::{ActorRegistryHandle, ServiceRegistryHandle};
use actormesh_transport::HttpRemoteTransport;

/// actormesh-gateway - control plane for the actormesh platform
#[derive(Parser)]
#[command(name = "actormesh-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the bind address
    #[arg(long)]
    listen: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    config
        .validate()
        .map_err(|message| anyhow::anyhow!("invalid configuration: {message}"))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let (actors, _actor_registry_task) = ActorRegistryHandle::spawn();
    let (services, _service_registry_task) = ServiceRegistryHandle::spawn();
    let events = EventBus::new();
    let metrics = Arc::new(GatewayMetrics::new().context("registering metrics")?);
    let secret = SharedSecret::new(config.api_key.clone());
    let transport =
        HttpRemoteTransport::new(secret.clone()).context("building control transport")?;

    let monitor = HealthMonitor::new(
        services.clone(),
        actors.clone(),
        events.clone(),
        Arc::clone(&metrics),
        config.probe_interval(),
        config.dead_threshold(),
    )
    .context("building health monitor")?;
    let _monitor_task = monitor.spawn();

    let state = Arc::new(AppState {
        actors,
        services,
        transport,
        events,
        secret,
        metrics,
        retry_after_secs: config.probe_interval_secs,
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(listen_addr = %config.listen_addr, auth = state.secret.is_enforced(), "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    // Errors installing the handler leave the process without graceful
    // shutdown but still serving.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
