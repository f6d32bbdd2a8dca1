//! Listener and lifecycle of the fleet API.
//!
//! [`FleetServer::bind`] claims the address before anything is served, so a
//! taken port fails startup early and port `0` yields the assigned address.
//! [`FleetServer::serve`] runs until the given shutdown future resolves,
//! then drains in-flight dispatches. The binary passes [`shutdown_signal`].

use std::net::SocketAddr;
use std::sync::Arc;

use oglike_fleet::FleetRepository;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Address the API listens on.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host or interface to bind, e.g. `0.0.0.0`.
    pub host: String,
    /// TCP port; `0` lets the OS pick one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// A bound, not yet serving, fleet API.
#[derive(Debug)]
pub struct FleetServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl FleetServer {
    /// Bind the listener described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be resolved or
    /// is already in use.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|e| ServerError::Bind(format!("{}:{}: {e}", config.host, config.port)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(format!("local address: {e}")))?;
        Ok(Self { listener, addr })
    }

    /// The address actually bound.
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve fleet dispatches until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] on a fatal I/O error.
    pub async fn serve<R, F>(self, state: Arc<AppState<R>>, shutdown: F) -> Result<(), ServerError>
    where
        R: FleetRepository,
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr;
        info!(%addr, "Fleet API listening");
        axum::serve(self.listener, build_router(state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;
        info!(%addr, "Fleet API stopped");
        Ok(())
    }
}

/// Resolves on `Ctrl-C`. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Failures of the listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The address could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// Serving stopped on an I/O error.
    #[error("serve error: {0}")]
    Serve(String),
}
