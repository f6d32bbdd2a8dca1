//! HTTP API for the OGLike fleet engine.
//!
//! Exposes fleet dispatch (`POST /api/fleets`) and ACS rendezvous
//! (`POST /api/fleets/acs`) over Axum, plus a health probe. Engine
//! rejections become JSON error bodies with a stable `kind` code.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{FleetServer, ServerConfig, ServerError, shutdown_signal};
pub use state::AppState;
