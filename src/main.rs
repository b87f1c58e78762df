use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomrelay::{
    router::build_router, websockets::InMemorySessionStore, AppState, Config, EventBus,
    InMemoryRoomRegistry, OffsetReader, PresenceSampler, SessionCoordinator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomrelay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    info!(addr = %config.addr, "Starting room relay server");

    // Display offsets are optional; without them counts go out raw
    let sampler = if config.display_offsets {
        let sampler_config = config.sampler_config();
        sampler_config
            .validate()
            .context("invalid sampler configuration")?;
        Some(PresenceSampler::start(sampler_config))
    } else {
        None
    };
    let offsets = sampler
        .as_ref()
        .map(PresenceSampler::reader)
        .unwrap_or_else(OffsetReader::disabled);

    let event_bus = EventBus::new(config.topic_capacity);
    let coordinator = Arc::new(SessionCoordinator::new(
        Arc::new(InMemoryRoomRegistry::new()),
        Arc::new(event_bus.clone()),
        Arc::new(InMemorySessionStore::new()),
        offsets,
        config.linked_rooms(),
    ));
    let app_state = AppState::new(coordinator, event_bus);

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Server running on http://{}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(sampler) = sampler {
        sampler.shutdown().await;
    }
    info!("Room relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
