//! Axum router construction for the fleet API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use oglike_fleet::FleetRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete router.
///
/// - `GET /health`
/// - `POST /api/fleets`
/// - `POST /api/fleets/acs`
///
/// CORS allows any origin so browser clients on other hosts can dispatch.
pub fn build_router<R: FleetRepository>(state: Arc<AppState<R>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/fleets", post(handlers::create_fleet::<R>))
        .route("/api/fleets/acs", post(handlers::create_acs_fleet::<R>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
