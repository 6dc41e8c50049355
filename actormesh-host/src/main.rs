//! Hosting service binary: an ActorSystem behind the `/runtime` facade,
//! registered with the control plane.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Layer 3: Internal module imports
use actormesh_core::{BusKind, ServiceId, SharedSecret};
use actormesh_host::{
    default_factory, facade_router, FacadeState, HostConfig, HostMetrics, RegistrationClient,
    SystemDelivery,
};
use actormesh_rt::{ActorFactory, ActorSystem};
use actormesh_transport::{BusConsumer, InMemoryBus, LocalDelivery, TopicResolver};

/// actormesh-host - actor hosting service for the actormesh platform
#[derive(Parser)]
#[command(name = "actormesh-host")]
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
    let mut config = HostConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    config
        .validate()
        .map_err(|message| anyhow::anyhow!("invalid configuration: {message}"))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.effective_workers())
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: HostConfig) -> anyhow::Result<()> {
    let secret = SharedSecret::new(config.api_key.clone());
    let factory = default_factory();
    let supported_types = factory.supported_types();

    let system = ActorSystem::new(
        config.runtime.clone(),
        config.service_id.as_str(),
        factory,
    );

    // Data plane: consume bus topics for locally hosted actors when a bus
    // is configured. The in-memory bus only spans this process; external
    // brokers plug in through the MessageBus trait.
    let consumer = match config.bus.kind {
        BusKind::Memory => {
            let bus = Arc::new(InMemoryBus::new());
            let consumer = BusConsumer::new(
                bus,
                TopicResolver::from_config(&config.bus),
                Arc::new(SystemDelivery::new(system.clone())) as Arc<dyn LocalDelivery>,
                system.events(),
            );
            consumer.start().await.context("starting bus consumer")?;
            Some(consumer)
        }
        BusKind::None => None,
    };

    let registration = RegistrationClient::new(
        config.gateway_url.clone(),
        secret.clone(),
        ServiceId::new(config.service_id.clone()),
        config.service_public_url.clone(),
        supported_types,
        config.heartbeat_interval(),
    )
    .context("building registration client")?;
    let _registration_task = registration.spawn();

    let state = Arc::new(FacadeState {
        system: system.clone(),
        secret,
        metrics: Arc::new(HostMetrics::new().context("registering metrics")?),
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    info!(
        listen_addr = %config.listen_addr,
        service_id = %config.service_id,
        "hosting service listening"
    );

    axum::serve(listener, facade_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    if let Some(consumer) = consumer {
        consumer.stop();
    }
    system.shutdown().await.ok();
    info!("hosting service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
