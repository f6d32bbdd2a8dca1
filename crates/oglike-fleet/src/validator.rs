//! Single-fleet validation against freshly fetched snapshots.
//!
//! [`FleetValidator::validate`] runs every check in a fixed order and fills
//! the derived fields of the fleet (arrival and return times, fuel
//! consumption). Cheap structural checks come before any fetch, and
//! ownership checks come before any timing computation.
//!
//! # Order
//!
//! 1. Universe resolution
//! 2. Structural validation against the universe dimensions
//! 3. Source resolution
//! 4. Target resolution (when the fleet names one)
//! 5. Target coordinate consistency
//! 6. Source ownership
//! 7. Player universe
//! 8. Target owner universe
//! 9. Multipliers
//! 10. Arrival time and consumption
//! 11. Objective, cargo, capacity, and availability rules
//!
//! Validation never writes. The returned [`Validation`] carries the source
//! snapshot and resolved catalog so the caller can persist the deduction
//! and, for ACS members, recompute fuel.

use std::collections::BTreeMap;

use oglike_types::{
    Fleet, PlanetSnapshot, Purpose, ResourceDescription, ResourceId, ShipDescription, ShipId,
    UniverseMultipliers, UniverseSnapshot,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::arrival::{self, FlightPlan, Leg};
use crate::error::FleetError;
use crate::repository::FleetRepository;
use crate::structure::{invalid, validate_structure};

/// A ship type of the fleet with its catalog entry and effective speed.
#[derive(Debug, Clone)]
pub struct ResolvedShip {
    /// Catalog entry.
    pub description: ShipDescription,
    /// Number of ships dispatched.
    pub count: u32,
    /// Speed from the source, propulsion included.
    pub speed: f64,
}

/// Everything learned while validating a fleet.
#[derive(Debug, Clone)]
pub struct Validation {
    /// Universe the fleet flies in.
    pub universe: UniverseSnapshot,
    /// Source planet or moon, as observed under the lock.
    pub source: PlanetSnapshot,
    /// Resolved target, absent for coordinate-only missions.
    pub target: Option<PlanetSnapshot>,
    /// Balance multipliers applied.
    pub multipliers: UniverseMultipliers,
    /// Ship types in fleet order.
    pub ships: Vec<ResolvedShip>,
    /// Unconstrained timing of the trip.
    pub plan: FlightPlan,
    /// Catalog entries of every cargo and fuel resource.
    pub resources: BTreeMap<ResourceId, ResourceDescription>,
}

impl Validation {
    /// Ship types as fuel computation legs.
    pub fn legs(&self) -> Vec<Leg<'_>> {
        self.ships
            .iter()
            .map(|s| Leg {
                ship: &s.description,
                count: s.count,
                speed: s.speed,
            })
            .collect()
    }

    /// Total cargo capacity of the fleet.
    pub fn capacity(&self) -> Decimal {
        self.ships
            .iter()
            .map(|s| Decimal::from(s.description.cargo).saturating_mul(Decimal::from(s.count)))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Recompute fuel for a fleet that holds `holding_seconds` before the
    /// joint departure, then check it still fits and is still available.
    pub fn refuel(&self, fleet: &mut Fleet, holding_seconds: i64) -> Result<(), FleetError> {
        fleet.consumption =
            arrival::consumption(&self.plan, &self.legs(), &self.multipliers, holding_seconds);
        check_capacity(fleet, self)?;
        check_availability(fleet, &self.source)
    }
}

/// Validates one fleet against the storage boundary.
#[derive(Debug)]
pub struct FleetValidator<'a, R> {
    repo: &'a R,
}

impl<'a, R: FleetRepository> FleetValidator<'a, R> {
    /// Validator reading through `repo`.
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Validate `fleet` and fill its derived fields.
    ///
    /// Departure is `fleet.created_at`.
    pub async fn validate(&self, fleet: &mut Fleet) -> Result<Validation, FleetError> {
        let universe = self
            .repo
            .universe(fleet.universe)
            .await?
            .ok_or(FleetError::InvalidUniverse)?;

        validate_structure(fleet, &universe)?;

        let source = self
            .repo
            .planet(fleet.source, fleet.source_type)
            .await?
            .ok_or(FleetError::InvalidSource)?;

        let target = match fleet.target {
            Some(id) => Some(
                self.repo
                    .planet(id, fleet.target_coordinates.location)
                    .await?
                    .ok_or(FleetError::InvalidTarget)?,
            ),
            None => None,
        };

        if let Some(target) = &target {
            if target.coordinates != fleet.target_coordinates {
                return Err(FleetError::TargetCoordinateMismatch {
                    expected: fleet.target_coordinates,
                    actual: target.coordinates,
                });
            }
        }

        if source.player != Some(fleet.player) {
            return Err(FleetError::PlayerDoesNotOwnSource);
        }

        let player = self
            .repo
            .player(fleet.player)
            .await?
            .ok_or(FleetError::PlayerUniverseMismatch)?;
        if player.universe != fleet.universe {
            return Err(FleetError::PlayerUniverseMismatch);
        }

        if let Some(owner) = target.as_ref().and_then(|t| t.player) {
            let owner = self
                .repo
                .player(owner)
                .await?
                .ok_or(FleetError::InvalidTarget)?;
            if owner.universe != fleet.universe {
                return Err(FleetError::InvalidTarget);
            }
        }

        let multipliers = self
            .repo
            .multipliers(fleet.universe)
            .await?
            .ok_or(FleetError::InvalidUniverse)?;

        let ships = self.resolve_ships(fleet, &source).await?;
        let slowest = ships
            .iter()
            .map(|s| s.speed)
            .fold(f64::INFINITY, f64::min);
        let distance = arrival::distance(&source.coordinates, &fleet.target_coordinates);
        let plan = arrival::plan(distance, slowest, fleet.speed, &multipliers).ok_or_else(|| {
            FleetError::InvalidFleetStructure("fleet cannot move".to_owned())
        })?;
        let departure = fleet.created_at;
        schedule(fleet, &plan, departure)?;

        let resources = self.resolve_resources(fleet, &ships).await?;
        let validation = Validation {
            universe,
            source,
            target,
            multipliers,
            ships,
            plan,
            resources,
        };
        fleet.consumption =
            arrival::consumption(&validation.plan, &validation.legs(), &multipliers, 0);

        self.check_objective(fleet, &validation).await?;
        check_cargo(fleet, &validation)?;
        check_capacity(fleet, &validation)?;
        check_availability(fleet, &validation.source)?;

        debug!(
            fleet_id = %fleet.id,
            distance = validation.plan.distance,
            duration_seconds = validation.plan.duration_seconds,
            "Fleet validated"
        );
        Ok(validation)
    }

    async fn resolve_ships(
        &self,
        fleet: &Fleet,
        source: &PlanetSnapshot,
    ) -> Result<Vec<ResolvedShip>, FleetError> {
        let ids: Vec<ShipId> = fleet.ships.iter().map(|s| s.ship).collect();
        let catalog: BTreeMap<ShipId, ShipDescription> = self
            .repo
            .ships(&ids)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        fleet
            .ships
            .iter()
            .map(|entry| {
                let description = catalog.get(&entry.ship).cloned().ok_or_else(|| {
                    FleetError::InvalidFleetStructure(format!("unknown ship {}", entry.ship))
                })?;
                let speed = arrival::ship_speed(&description, source);
                Ok(ResolvedShip {
                    description,
                    count: entry.count,
                    speed,
                })
            })
            .collect()
    }

    async fn resolve_resources(
        &self,
        fleet: &Fleet,
        ships: &[ResolvedShip],
    ) -> Result<BTreeMap<ResourceId, ResourceDescription>, FleetError> {
        let mut ids: Vec<ResourceId> = fleet.cargo.iter().map(|c| c.resource).collect();
        for ship in ships {
            ids.extend(ship.description.fuel.keys().copied());
            ids.extend(ship.description.holding_cost.keys().copied());
        }
        ids.sort_unstable();
        ids.dedup();

        Ok(self
            .repo
            .resources(&ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect())
    }

    async fn check_objective(&self, fleet: &Fleet, validation: &Validation) -> Result<(), FleetError> {
        let objective = fleet.objective;

        if !validation
            .ships
            .iter()
            .any(|s| s.description.objectives.contains(&objective))
        {
            return Err(invalid(objective, "cannot be performed by any ship"));
        }

        if objective.is_hostile()
            && validation
                .target
                .as_ref()
                .is_some_and(|t| t.player == Some(fleet.player))
        {
            return Err(invalid(objective, "cannot target own planets"));
        }

        match objective {
            Purpose::Colonization
                if fleet
                    .target_coordinates
                    .same_position(&validation.source.coordinates) =>
            {
                Err(invalid(objective, "cannot target the source position"))
            }
            Purpose::Harvesting => {
                if self
                    .repo
                    .debris_field_exists(fleet.universe, fleet.target_coordinates)
                    .await?
                {
                    Ok(())
                } else {
                    Err(invalid(objective, "needs an existing debris field"))
                }
            }
            _ => Ok(()),
        }
    }
}

/// Set arrival and return times for a departure at `departure`.
pub(crate) fn schedule(
    fleet: &mut Fleet,
    plan: &FlightPlan,
    departure: chrono::DateTime<chrono::Utc>,
) -> Result<(), FleetError> {
    let out_of_range = || FleetError::InvalidFleetStructure("flight time out of range".to_owned());
    fleet.arrival_time = plan.arrival_from(departure).ok_or_else(out_of_range)?;
    fleet.return_time = plan.arrival_from(fleet.arrival_time).ok_or_else(out_of_range)?;
    Ok(())
}

fn check_cargo(fleet: &Fleet, validation: &Validation) -> Result<(), FleetError> {
    for entry in &fleet.cargo {
        let resource = validation.resources.get(&entry.resource).ok_or_else(|| {
            FleetError::InvalidFleetStructure(format!("unknown resource {}", entry.resource))
        })?;
        if !resource.movable {
            return Err(FleetError::ImmovableCargo);
        }
    }
    Ok(())
}

/// Cargo and fuel each fit in the fleet holds.
pub fn check_capacity(fleet: &Fleet, validation: &Validation) -> Result<(), FleetError> {
    let capacity = validation.capacity();
    let cargo = fleet.used_cargo().ok_or(FleetError::CapacityExceeded)?;
    let fuel = fleet.used_fuel().ok_or(FleetError::CapacityExceeded)?;
    if cargo > capacity || fuel > capacity {
        return Err(FleetError::CapacityExceeded);
    }
    Ok(())
}

/// The source holds the ships, cargo, and fuel the fleet takes away.
pub fn check_availability(fleet: &Fleet, source: &PlanetSnapshot) -> Result<(), FleetError> {
    if fleet
        .ships
        .iter()
        .any(|s| source.ship_count(s.ship) < s.count)
    {
        return Err(FleetError::InsufficientResources);
    }

    let mut needed: BTreeMap<ResourceId, Decimal> = BTreeMap::new();
    for entry in fleet.cargo.iter().chain(&fleet.consumption) {
        let total = needed.entry(entry.resource).or_insert(Decimal::ZERO);
        *total = total.saturating_add(entry.amount);
    }
    if needed
        .iter()
        .any(|(resource, amount)| source.resource_amount(*resource) < *amount)
    {
        return Err(FleetError::InsufficientResources);
    }
    Ok(())
}
