//! Row types and column conversions shared by the stores.
//!
//! Counts and coordinates are stored as `INTEGER`, enums as `TEXT`. Every
//! value read back is checked before it reaches the domain model.

use chrono::{DateTime, Utc};
use oglike_types::{Coordinate, LocationKind, Purpose};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DbError;

/// Every objective, in declaration order.
const PURPOSES: [Purpose; 10] = [
    Purpose::Deployment,
    Purpose::Transport,
    Purpose::Colonization,
    Purpose::Expedition,
    Purpose::AcsDefend,
    Purpose::AcsAttack,
    Purpose::Harvesting,
    Purpose::Attacking,
    Purpose::Espionage,
    Purpose::Destroy,
];

// =============================================================================
// Enum mappings
// =============================================================================

/// Convert a [`LocationKind`] to its database string.
pub const fn location_to_db(kind: LocationKind) -> &'static str {
    match kind {
        LocationKind::Planet => "planet",
        LocationKind::Moon => "moon",
        LocationKind::Debris => "debris",
    }
}

/// Parse a [`LocationKind`] from its database string.
pub fn location_from_db(value: &str) -> Result<LocationKind, DbError> {
    match value {
        "planet" => Ok(LocationKind::Planet),
        "moon" => Ok(LocationKind::Moon),
        "debris" => Ok(LocationKind::Debris),
        other => Err(DbError::Corrupt(format!("unknown location kind {other:?}"))),
    }
}

/// Convert a [`Purpose`] to its database string.
pub const fn purpose_to_db(purpose: Purpose) -> &'static str {
    purpose.as_str()
}

/// Parse a [`Purpose`] from its database string.
pub fn purpose_from_db(value: &str) -> Result<Purpose, DbError> {
    PURPOSES
        .into_iter()
        .find(|p| p.as_str() == value)
        .ok_or_else(|| DbError::Corrupt(format!("unknown objective {value:?}")))
}

// =============================================================================
// Integer columns
// =============================================================================

/// Read a non-negative `INTEGER` column.
pub fn to_u32(value: i32, column: &str) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|e| DbError::Corrupt(format!("{column} = {value}: {e}")))
}

/// Write an unsigned value into an `INTEGER` column.
pub fn to_i32(value: u32, column: &str) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|e| DbError::Corrupt(format!("{column} = {value}: {e}")))
}

/// Rebuild a coordinate from its stored columns.
pub fn coordinate(
    galaxy: i32,
    solar_system: i32,
    position: i32,
    location: LocationKind,
) -> Result<Coordinate, DbError> {
    Ok(Coordinate::new(
        to_u32(galaxy, "galaxy")?,
        to_u32(solar_system, "solar_system")?,
        to_u32(position, "position")?,
        location,
    ))
}

/// Stored columns of a coordinate, in table order.
pub fn coordinate_columns(coordinates: Coordinate) -> Result<(i32, i32, i32), DbError> {
    Ok((
        to_i32(coordinates.galaxy, "galaxy")?,
        to_i32(coordinates.system, "solar_system")?,
        to_i32(coordinates.position, "position")?,
    ))
}

// =============================================================================
// Rows
// =============================================================================

/// A row from `universes`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UniverseRow {
    /// Universe UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Number of galaxies.
    pub galaxies_count: i32,
    /// Solar systems per galaxy.
    pub galaxy_size: i32,
    /// Positions per solar system.
    pub solar_system_size: i32,
}

/// A row from `universe_multipliers`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MultipliersRow {
    /// Fleet speed multiplier.
    pub fleet_speed: f64,
    /// Fuel consumption multiplier.
    pub consumption: f64,
}

/// A planet or a moon with the coordinates of its planet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BodyRow {
    /// Planet or moon UUID.
    pub id: Uuid,
    /// Owning player, if any.
    pub player: Option<Uuid>,
    /// Galaxy index.
    pub galaxy: i32,
    /// Solar system index.
    pub solar_system: i32,
    /// Position in the solar system.
    pub position: i32,
}

/// A row from `players`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Player UUID.
    pub id: Uuid,
    /// Universe the player belongs to.
    pub universe: Uuid,
    /// Display name.
    pub name: String,
}

/// A row from `ships`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShipRow {
    /// Ship UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Cargo capacity per ship.
    pub cargo: i64,
    /// Base speed.
    pub base_speed: i32,
    /// Technology raising the speed.
    pub propulsion_technology: Option<Uuid>,
    /// Speed increase per technology level.
    pub propulsion_increase: Option<f64>,
}

/// A per-ship resource amount (`ships_fuel`, `ships_holding_cost`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShipAmountRow {
    /// Ship UUID.
    pub ship: Uuid,
    /// Resource UUID.
    pub resource: Uuid,
    /// Amount per ship.
    pub amount: Decimal,
}

/// A row from `ships_objectives`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShipObjectiveRow {
    /// Ship UUID.
    pub ship: Uuid,
    /// Objective the ship can perform.
    pub objective: String,
}

/// A row from `resources`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResourceRow {
    /// Resource UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether fleets can carry it.
    pub movable: bool,
}

/// A row from `acs_fleets`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AcsRow {
    /// Rendezvous UUID.
    pub id: Uuid,
    /// Universe UUID.
    pub universe: Uuid,
    /// Shared objective.
    pub objective: String,
    /// Shared target entity.
    pub target: Option<Uuid>,
    /// Galaxy index.
    pub galaxy: i32,
    /// Solar system index.
    pub solar_system: i32,
    /// Position in the solar system.
    pub position: i32,
    /// Location kind at the coordinates.
    pub location: String,
    /// Agreed arrival time.
    pub arrival_time: Option<DateTime<Utc>>,
}

/// The identifying columns of a stored fleet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FleetHeadRow {
    /// Fleet UUID.
    pub id: Uuid,
    /// Issuing player.
    pub player: Uuid,
    /// Rendezvous membership.
    pub acs: Option<Uuid>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_objective_parses_back() {
        for purpose in PURPOSES {
            assert_eq!(purpose_from_db(purpose_to_db(purpose)).unwrap(), purpose);
        }
        assert!(purpose_from_db("invade").is_err());
    }

    #[test]
    fn locations_parse_back() {
        for kind in [LocationKind::Planet, LocationKind::Moon, LocationKind::Debris] {
            assert_eq!(location_from_db(location_to_db(kind)).unwrap(), kind);
        }
    }

    #[test]
    fn negative_columns_are_corrupt() {
        assert!(matches!(to_u32(-1, "count"), Err(DbError::Corrupt(_))));
        assert!(matches!(to_i32(u32::MAX, "count"), Err(DbError::Corrupt(_))));
        assert_eq!(to_u32(7, "count").unwrap(), 7);
    }
}
