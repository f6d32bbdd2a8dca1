//! Error types for the fleet API.
//!
//! [`ApiError`] carries engine rejections and malformed bodies to the
//! client. The engine never picks status codes; the mapping lives here.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use oglike_fleet::FleetError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The engine rejected the request.
    #[error(transparent)]
    Fleet(#[from] FleetError),

    /// The request body is not a valid fleet request.
    #[error("malformed request: {0}")]
    Malformed(#[from] JsonRejection),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Fleet(err) => fleet_status(err),
            Self::Malformed(rejection) => rejection.status(),
        }
    }

    /// Stable machine-readable code.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fleet(err) => err.kind(),
            Self::Malformed(_) => "malformed_request",
        }
    }
}

const fn fleet_status(err: &FleetError) -> StatusCode {
    match err {
        FleetError::InvalidUniverse
        | FleetError::InvalidSource
        | FleetError::InvalidTarget
        | FleetError::UnknownAcs => StatusCode::NOT_FOUND,
        FleetError::PlayerDoesNotOwnSource | FleetError::PlayerUniverseMismatch => {
            StatusCode::FORBIDDEN
        }
        FleetError::DuplicateFleet => StatusCode::CONFLICT,
        FleetError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Storage details stay in the logs.
        let message = match &self {
            Self::Fleet(FleetError::Storage(_)) => String::from("storage unavailable"),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "kind": self.kind(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use oglike_fleet::RepositoryError;

    use super::*;

    #[test]
    fn lookups_map_to_not_found() {
        for err in [
            FleetError::InvalidUniverse,
            FleetError::InvalidSource,
            FleetError::InvalidTarget,
            FleetError::UnknownAcs,
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn ownership_maps_to_forbidden() {
        assert_eq!(
            ApiError::from(FleetError::PlayerDoesNotOwnSource).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(FleetError::PlayerUniverseMismatch).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn remaining_kinds() {
        assert_eq!(
            ApiError::from(FleetError::DuplicateFleet).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(FleetError::Storage(RepositoryError::Backend("down".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(FleetError::AcsArrivalTooLate).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FleetError::CapacityExceeded).kind(),
            "capacity_exceeded"
        );
    }
}
