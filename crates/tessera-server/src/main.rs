//! Tessera server binary.
//!
//! This is the deployable entry point: it loads configuration, selects
//! and initializes the board store backend, wires the registry, engine,
//! and broadcast hub, and serves the HTTP + `WebSocket` API until the
//! process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `tessera.yaml` (env overrides applied)
//! 3. Construct the board store (memory or `PostgreSQL` + migrations)
//! 4. Wire registry, placement engine, and broadcast hub
//! 5. Serve

mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tessera_api::{start_server, AppState, ServerConfig};
use tessera_store::{BoardStore, MemoryBoardStore, PgBoardStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, StoreBackend};

/// Default configuration file path, relative to the working directory.
const CONFIG_PATH: &str = "tessera.yaml";

/// Application entry point for the Tessera server.
///
/// # Errors
///
/// Returns an error if configuration loading, store initialization, or
/// the server itself fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("tessera-server starting");

    // 2. Load configuration.
    let config = AppConfig::load(Path::new(CONFIG_PATH))
        .with_context(|| format!("loading configuration from {CONFIG_PATH}"))?;
    info!(
        host = config.server.host,
        port = config.server.port,
        backend = ?config.store.backend,
        "Configuration loaded"
    );

    // 3. Construct the board store.
    let store: Arc<dyn BoardStore> = match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory board store (boards do not survive restarts)");
            Arc::new(MemoryBoardStore::new())
        }
        StoreBackend::Postgres => {
            let pg = PgBoardStore::connect_url(&config.store.postgres_url)
                .await
                .context("connecting to PostgreSQL")?;
            pg.run_migrations()
                .await
                .context("running board store migrations")?;
            Arc::new(pg)
        }
    };

    // 4. Wire registry, engine, and hub.
    let state = Arc::new(AppState::new(store));

    // 5. Serve until terminated.
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    start_server(&server_config, state)
        .await
        .context("running board API server")?;

    Ok(())
}
