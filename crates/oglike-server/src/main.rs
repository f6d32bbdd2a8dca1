//! Fleet API server for OGLike.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `oglike-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the `PostgreSQL` pool, migrating when enabled
//! 4. Build the fleet engine over the `PostgreSQL` repository
//! 5. Bind the listener and serve the HTTP API until `Ctrl-C`

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use oglike_api::{AppState, FleetServer, ServerConfig, shutdown_signal};
use oglike_db::{PgFleetRepository, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::AppError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "oglike-config.yaml";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let (config, found) = config::load(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("oglike-server starting");
    if !found {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        max_connections = config.database.max_connections,
        "Configuration loaded"
    );

    // 3. Open the pool.
    let pool = PostgresPool::open(&config.database.pool_config()).await?;

    // 4. Wire the engine.
    let repo = Arc::new(PgFleetRepository::new(pool.clone()));
    let state = Arc::new(AppState::new(repo));

    // 5. Bind, then serve.
    let listen = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let served = match FleetServer::bind(&listen).await {
        Ok(server) => server.serve(state, shutdown_signal()).await,
        Err(e) => Err(e),
    };

    pool.close().await;
    served?;
    info!("oglike-server stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
