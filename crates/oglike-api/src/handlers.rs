//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/fleets` | Dispatch a fleet |
//! | `POST` | `/api/fleets/acs` | Found or join an ACS rendezvous |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use oglike_fleet::FleetRepository;
use oglike_types::{AcsId, CreateAcsFleetRequest, CreateFleetRequest, FleetId};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `201 Created` for a plain fleet.
#[derive(Debug, Serialize)]
pub struct FleetCreated {
    /// Id of the accepted fleet.
    pub id: FleetId,
}

/// Body of `201 Created` for an ACS component.
#[derive(Debug, Serialize)]
pub struct AcsFleetCreated {
    /// Id of the accepted fleet.
    pub id: FleetId,
    /// Rendezvous the fleet belongs to.
    pub acs: AcsId,
}

/// `GET /health`
#[allow(clippy::unused_async)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/fleets`
pub async fn create_fleet<R: FleetRepository>(
    State(state): State<Arc<AppState<R>>>,
    body: Result<Json<CreateFleetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FleetCreated>), ApiError> {
    let Json(request) = body?;
    let id = state.fleets.create(request).await?;
    Ok((StatusCode::CREATED, Json(FleetCreated { id })))
}

/// `POST /api/fleets/acs`
pub async fn create_acs_fleet<R: FleetRepository>(
    State(state): State<Arc<AppState<R>>>,
    body: Result<Json<CreateAcsFleetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AcsFleetCreated>), ApiError> {
    let Json(request) = body?;
    let created = state.fleets.acs_create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(AcsFleetCreated {
            id: created.fleet,
            acs: created.acs,
        }),
    ))
}
