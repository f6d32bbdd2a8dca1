//! Error types for the fleet engine.
//!
//! [`FleetError`] is the semantic rejection taxonomy returned by
//! `Create` and `ACSCreate`. It never carries an HTTP status: translating
//! kinds into responses is the caller's job. [`RepositoryError`] describes
//! failures of the storage boundary and surfaces as [`FleetError::Storage`],
//! except for the write rejections mapped by [`FleetError::from_write`].

use oglike_types::Coordinate;

/// Failures reported by a [`FleetRepository`](crate::FleetRepository).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The backend could not be reached or the query failed.
    #[error("backend failure: {0}")]
    Backend(String),

    /// Stored data could not be decoded into domain values.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The source planet no longer holds what the fleet takes away.
    #[error("deduction rejected: {0}")]
    Deduction(String),

    /// A record with the same identity was written concurrently.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Reasons a fleet dispatch is rejected.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// The universe does not exist.
    #[error("invalid universe")]
    InvalidUniverse,

    /// Malformed request: bad coordinates, no ships, unknown ship types.
    #[error("invalid fleet structure: {0}")]
    InvalidFleetStructure(String),

    /// The source planet or moon does not exist.
    #[error("invalid source")]
    InvalidSource,

    /// The target does not exist or lives in another universe.
    #[error("invalid target")]
    InvalidTarget,

    /// The target entity is not at the declared coordinates.
    #[error("target is at {actual}, not at {expected}")]
    TargetCoordinateMismatch {
        /// Coordinates declared in the request.
        expected: Coordinate,
        /// Coordinates of the resolved target.
        actual: Coordinate,
    },

    /// The source is owned by someone else.
    #[error("player does not own the source")]
    PlayerDoesNotOwnSource,

    /// The player does not belong to the requested universe.
    #[error("player does not belong to this universe")]
    PlayerUniverseMismatch,

    /// The objective cannot be carried out with this fleet or target.
    #[error("invalid objective: {0}")]
    InvalidObjective(String),

    /// The source lacks the ships, fuel, or cargo requested.
    #[error("insufficient resources on source")]
    InsufficientResources,

    /// The fleet cannot carry the declared cargo or the fuel it needs.
    #[error("cargo capacity exceeded")]
    CapacityExceeded,

    /// A cargo entry names a resource ships cannot carry.
    #[error("resource cannot be carried")]
    ImmovableCargo,

    /// The referenced ACS rendezvous does not exist.
    #[error("unknown ACS")]
    UnknownAcs,

    /// The fleet does not share the rendezvous universe, target, or objective.
    #[error("fleet does not match the ACS")]
    AcsMismatch,

    /// The fleet cannot reach the rendezvous by the agreed arrival time.
    #[error("fleet arrives after the ACS")]
    AcsArrivalTooLate,

    /// The client id is already taken by another player's fleet.
    #[error("fleet id already in use")]
    DuplicateFleet,

    /// The storage boundary failed.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl FleetError {
    /// Stable snake-case code for this rejection.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUniverse => "invalid_universe",
            Self::InvalidFleetStructure(_) => "invalid_fleet_structure",
            Self::InvalidSource => "invalid_source",
            Self::InvalidTarget => "invalid_target",
            Self::TargetCoordinateMismatch { .. } => "target_coordinate_mismatch",
            Self::PlayerDoesNotOwnSource => "player_does_not_own_source",
            Self::PlayerUniverseMismatch => "player_universe_mismatch",
            Self::InvalidObjective(_) => "invalid_objective",
            Self::InsufficientResources => "insufficient_resources",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::ImmovableCargo => "immovable_cargo",
            Self::UnknownAcs => "unknown_acs",
            Self::AcsMismatch => "acs_mismatch",
            Self::AcsArrivalTooLate => "acs_arrival_too_late",
            Self::DuplicateFleet => "duplicate_fleet",
            Self::Storage(_) => "storage_error",
        }
    }

    /// Rejection for a failed final write.
    ///
    /// A source that no longer covers the deduction is
    /// [`InsufficientResources`](Self::InsufficientResources) and an id taken
    /// by a concurrent writer is [`DuplicateFleet`](Self::DuplicateFleet).
    pub fn from_write(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Deduction(_) => Self::InsufficientResources,
            RepositoryError::Conflict(_) => Self::DuplicateFleet,
            other => Self::Storage(other),
        }
    }

    /// Consistency violations that hint at a tampered or buggy client.
    pub const fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::TargetCoordinateMismatch { .. }
                | Self::PlayerDoesNotOwnSource
                | Self::PlayerUniverseMismatch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_violations_are_suspicious() {
        assert!(FleetError::PlayerDoesNotOwnSource.is_suspicious());
        assert!(FleetError::PlayerUniverseMismatch.is_suspicious());
        assert!(!FleetError::InsufficientResources.is_suspicious());
    }

    #[test]
    fn storage_wraps_repository_errors() {
        let err = FleetError::from(RepositoryError::Backend("timeout".to_owned()));
        assert_eq!(err.kind(), "storage_error");
        assert_eq!(err.to_string(), "storage error: backend failure: timeout");
    }

    #[test]
    fn write_rejections_keep_their_meaning() {
        let short = FleetError::from_write(RepositoryError::Deduction("ship".to_owned()));
        assert_eq!(short.kind(), "insufficient_resources");
        let taken = FleetError::from_write(RepositoryError::Conflict("fleets_pkey".to_owned()));
        assert_eq!(taken.kind(), "duplicate_fleet");
        let down = FleetError::from_write(RepositoryError::Backend("reset".to_owned()));
        assert_eq!(down.kind(), "storage_error");
    }
}
