//! Core entity structs: coordinates, fleets, and ACS rendezvous aggregates.
//!
//! These are the values the engine reads from requests, fills with derived
//! fields, and hands to the persistence boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LocationKind, Purpose};
use crate::ids::{AcsId, FleetId, PlanetId, PlayerId, ResourceId, ShipId, UniverseId};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A location inside a universe: galaxy, solar system, position, and kind.
///
/// All three indices are zero-based and bounded by the universe dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Galaxy index.
    pub galaxy: u32,
    /// Solar system index inside the galaxy.
    pub system: u32,
    /// Position inside the solar system.
    pub position: u32,
    /// What is targeted at this position.
    pub location: LocationKind,
}

impl Coordinate {
    /// Build a coordinate.
    pub const fn new(galaxy: u32, system: u32, position: u32, location: LocationKind) -> Self {
        Self {
            galaxy,
            system,
            position,
            location,
        }
    }

    /// Whether both coordinates designate the same position, ignoring kind.
    pub const fn same_position(&self, other: &Self) -> bool {
        self.galaxy == other.galaxy
            && self.system == other.system
            && self.position == other.position
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}:{}:{} {:?}]",
            self.galaxy, self.system, self.position, self.location
        )
    }
}

// ---------------------------------------------------------------------------
// Fleet contents
// ---------------------------------------------------------------------------

/// A number of ships of a single type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ShipInFleet {
    /// Ship type.
    pub ship: ShipId,
    /// Number of ships of this type.
    pub count: u32,
}

/// An amount of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceAmount {
    /// Resource type.
    pub resource: ResourceId,
    /// Amount of the resource.
    #[ts(as = "String")]
    pub amount: Decimal,
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

/// A dispatch order: ships leaving a source toward target coordinates.
///
/// `arrival_time`, `return_time`, `deployment_time`, `consumption`, and `acs`
/// are written by the engine during validation, never taken from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Fleet {
    /// Fleet identifier.
    pub id: FleetId,
    /// Universe the fleet flies in.
    pub universe: UniverseId,
    /// Player issuing the fleet. Must own the source.
    pub player: PlayerId,
    /// Planet or moon the fleet leaves from.
    pub source: PlanetId,
    /// Whether the source is a planet or a moon.
    pub source_type: LocationKind,
    /// Target entity, absent for colonization, expedition, and harvesting.
    pub target: Option<PlanetId>,
    /// Destination coordinates.
    pub target_coordinates: Coordinate,
    /// Mission of the fleet.
    pub objective: Purpose,
    /// ACS rendezvous this fleet belongs to.
    pub acs: Option<AcsId>,
    /// Fraction of the maximum speed, in `(0, 1]`.
    pub speed: f64,
    /// Ships in the fleet, one entry per ship type.
    pub ships: Vec<ShipInFleet>,
    /// Resources carried, one entry per resource.
    pub cargo: Vec<ResourceAmount>,
    /// When the dispatch was accepted.
    pub created_at: DateTime<Utc>,
    /// When the fleet reaches its target.
    pub arrival_time: DateTime<Utc>,
    /// Seconds the fleet holds at the rendezvous before the joint departure.
    pub deployment_time: i64,
    /// When the fleet is back at its source.
    pub return_time: DateTime<Utc>,
    /// Fuel burnt by the trip.
    pub consumption: Vec<ResourceAmount>,
}

impl Fleet {
    /// Total number of ships in the fleet.
    pub fn ship_count(&self) -> u64 {
        self.ships.iter().map(|s| u64::from(s.count)).sum()
    }

    /// Total amount of resources carried as cargo, `None` past
    /// [`Decimal::MAX`].
    pub fn used_cargo(&self) -> Option<Decimal> {
        checked_total(&self.cargo)
    }

    /// Total fuel burnt by the trip, `None` past [`Decimal::MAX`].
    pub fn used_fuel(&self) -> Option<Decimal> {
        checked_total(&self.consumption)
    }
}

fn checked_total(amounts: &[ResourceAmount]) -> Option<Decimal> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |total, entry| total.checked_add(entry.amount))
}

// ---------------------------------------------------------------------------
// ACS rendezvous
// ---------------------------------------------------------------------------

/// A rendezvous aggregate: several fleets converging on the same target at
/// the same agreed arrival time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AcsFleet {
    /// Aggregate identifier.
    pub id: AcsId,
    /// Universe of every member.
    pub universe: UniverseId,
    /// Objective shared by every member.
    pub objective: Purpose,
    /// Target entity shared by every member.
    pub target: Option<PlanetId>,
    /// Target coordinates shared by every member.
    pub target_coordinates: Coordinate,
    /// Member fleets, in joining order.
    pub members: Vec<FleetId>,
    /// Agreed arrival time, set by the founding member.
    pub arrival_time: Option<DateTime<Utc>>,
}

impl AcsFleet {
    /// Whether no fleet has committed to this rendezvous yet.
    pub const fn is_unfounded(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_wire_shape() {
        let c = Coordinate::new(0, 260, 7, LocationKind::Planet);
        let json = serde_json::to_value(c).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "galaxy": 0,
                "system": 260,
                "position": 7,
                "location": "planet",
            }))
        );
    }

    #[test]
    fn same_position_ignores_kind() {
        let planet = Coordinate::new(1, 2, 3, LocationKind::Planet);
        let debris = Coordinate::new(1, 2, 3, LocationKind::Debris);
        assert!(planet.same_position(&debris));
        assert_ne!(planet, debris);
    }

    fn carrying(cargo: Vec<ResourceAmount>) -> Fleet {
        let now = Utc::now();
        Fleet {
            id: FleetId::new(),
            universe: UniverseId::new(),
            player: PlayerId::new(),
            source: PlanetId::new(),
            source_type: LocationKind::Planet,
            target: Some(PlanetId::new()),
            target_coordinates: Coordinate::new(0, 1, 2, LocationKind::Planet),
            objective: Purpose::Transport,
            acs: None,
            speed: 1.0,
            ships: Vec::new(),
            cargo,
            created_at: now,
            arrival_time: now,
            deployment_time: 0,
            return_time: now,
            consumption: Vec::new(),
        }
    }

    #[test]
    fn cargo_total_overflow_is_none() {
        let fleet = carrying(vec![
            ResourceAmount {
                resource: ResourceId::new(),
                amount: Decimal::MAX,
            },
            ResourceAmount {
                resource: ResourceId::new(),
                amount: Decimal::ONE,
            },
        ]);
        assert_eq!(fleet.used_cargo(), None);
        assert_eq!(fleet.used_fuel(), Some(Decimal::ZERO));
    }

    #[test]
    fn cargo_total_sums_every_resource() {
        let fleet = carrying(vec![
            ResourceAmount {
                resource: ResourceId::new(),
                amount: Decimal::TEN,
            },
            ResourceAmount {
                resource: ResourceId::new(),
                amount: Decimal::ONE,
            },
        ]);
        assert_eq!(fleet.used_cargo(), Some(Decimal::from(11)));
    }
}
