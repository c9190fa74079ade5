//! Inventory server entry point.
//!
//! Loads settings, prepares storage (pool and migrations, or the in-memory
//! store), then serves the REST API with health checks.

mod server;

use std::net::SocketAddr;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use inventory::config::InventorySettings;
use inventory::inbound::http::health::HealthState;
use inventory::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, build_services, create_server};

async fn server_config(settings: &InventorySettings) -> std::io::Result<ServerConfig> {
    let bind_addr: SocketAddr = settings.bind_addr().parse().map_err(|err| {
        std::io::Error::other(format!("invalid bind address {}: {err}", settings.bind_addr()))
    })?;
    let config = ServerConfig::new(bind_addr)
        .with_lock_timeout(settings.lock_timeout())
        .with_low_stock_threshold(settings.low_stock_threshold())
        .with_telemetry_topic(settings.telemetry_topic());

    let Some(database_url) = settings.database_url.as_deref() else {
        warn!("no database configured; using the in-memory store");
        return Ok(config);
    };

    let applied = run_pending_migrations(database_url)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|err| std::io::Error::other(err.into_message()))?;
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        InventorySettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let config = server_config(&settings).await?;
    let services = build_services(&config);
    info!(
        topic = services.telemetry.topic_filter(),
        "telemetry handler ready for a transport"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &services, &config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
