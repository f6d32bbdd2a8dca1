//! Point-in-time reads of persisted entities and catalog descriptions.
//!
//! Snapshots are fetched fresh for every request and never mutated by the
//! engine. Resource deduction happens at the storage boundary.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Purpose;
use crate::ids::{AcsId, FleetId, PlanetId, PlayerId, ResourceId, ShipId, TechnologyId, UniverseId};
use crate::structs::Coordinate;

/// Dimensions and identity of a universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseSnapshot {
    /// Universe identifier.
    pub id: UniverseId,
    /// Display name.
    pub name: String,
    /// Number of galaxies.
    pub galaxies_count: u32,
    /// Number of solar systems per galaxy.
    pub galaxy_size: u32,
    /// Number of positions per solar system.
    pub solar_system_size: u32,
}

impl UniverseSnapshot {
    /// Whether the coordinate lies inside the universe bounds.
    pub const fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.galaxy < self.galaxies_count
            && coordinate.system < self.galaxy_size
            && coordinate.position < self.solar_system_size
    }
}

/// Game-balance factors attached to a universe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniverseMultipliers {
    /// Divides every flight duration.
    pub fleet_speed: f64,
    /// Scales fuel and holding costs.
    pub consumption: f64,
}

impl Default for UniverseMultipliers {
    fn default() -> Self {
        Self {
            fleet_speed: 1.0,
            consumption: 1.0,
        }
    }
}

/// A planet or moon as currently committed in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetSnapshot {
    /// Planet or moon identifier.
    pub id: PlanetId,
    /// Owner, absent for unowned bodies.
    pub player: Option<PlayerId>,
    /// Where the body sits. `location` is planet or moon.
    pub coordinates: Coordinate,
    /// Ships stationed on the body.
    pub ships: BTreeMap<ShipId, u32>,
    /// Resources stored on the body.
    pub resources: BTreeMap<ResourceId, Decimal>,
    /// Technology levels of the owner, as seen from this body.
    pub technologies: BTreeMap<TechnologyId, u32>,
}

impl PlanetSnapshot {
    /// Ships of the given type stationed here.
    pub fn ship_count(&self, ship: ShipId) -> u32 {
        self.ships.get(&ship).copied().unwrap_or(0)
    }

    /// Stock of the given resource.
    pub fn resource_amount(&self, resource: ResourceId) -> Decimal {
        self.resources.get(&resource).copied().unwrap_or(Decimal::ZERO)
    }

    /// Level of a technology, zero when never researched.
    pub fn technology_level(&self, technology: TechnologyId) -> u32 {
        self.technologies.get(&technology).copied().unwrap_or(0)
    }
}

/// A player's account inside one universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identifier.
    pub id: PlayerId,
    /// Universe the player lives in.
    pub universe: UniverseId,
    /// Display name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Technology improving a ship's speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Propulsion {
    /// Technology driving the engine.
    pub technology: TechnologyId,
    /// Fraction of base speed gained per technology level.
    pub increase_per_level: f64,
}

/// Static description of a ship type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipDescription {
    /// Ship type identifier.
    pub id: ShipId,
    /// Display name.
    pub name: String,
    /// Cargo capacity of one ship.
    pub cargo: u64,
    /// Speed before propulsion upgrades.
    pub base_speed: u32,
    /// Engine technology, absent for ships that cannot be upgraded.
    pub propulsion: Option<Propulsion>,
    /// Fuel burnt per ship, per resource, for the reference trip.
    pub fuel: BTreeMap<ResourceId, Decimal>,
    /// Fuel burnt per ship and per hour spent holding at a rendezvous.
    pub holding_cost: BTreeMap<ResourceId, Decimal>,
    /// Objectives this ship can perform.
    pub objectives: BTreeSet<Purpose>,
}

/// Static description of a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescription {
    /// Resource identifier.
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Whether ships can carry it. Energy, for instance, cannot be.
    pub movable: bool,
}

/// What storage remembers about an already accepted fleet, for replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingFleet {
    /// Fleet identifier.
    pub id: FleetId,
    /// Player who issued it.
    pub player: PlayerId,
    /// Rendezvous it belongs to.
    pub acs: Option<AcsId>,
}
