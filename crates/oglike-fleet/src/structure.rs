//! Static checks run before any snapshot is fetched.
//!
//! [`prepare`] turns a wire request into a [`Fleet`] with engine-owned
//! fields reset. [`validate_structure`] then rejects anything that can be
//! judged from the request and the universe dimensions alone.

use chrono::{DateTime, SubsecRound, Utc};
use oglike_types::{
    AcsFleet, CreateFleetRequest, Fleet, FleetId, LocationKind, Purpose, ResourceAmount,
    ShipInFleet, UniverseSnapshot,
};
use rust_decimal::Decimal;

use crate::error::FleetError;

/// Build a fleet from a request received at `now`.
///
/// Assigns an id when the client gave none, merges duplicate ship and cargo
/// entries in first-seen order, and clears every derived field. The
/// submission instant is truncated to whole seconds, the resolution of
/// every flight duration and holding time.
pub fn prepare(request: CreateFleetRequest, now: DateTime<Utc>) -> Result<Fleet, FleetError> {
    let now = now.trunc_subsecs(0);
    let objective = request
        .objective
        .ok_or_else(|| FleetError::InvalidFleetStructure("missing objective".to_owned()))?;

    Ok(Fleet {
        id: request.id.unwrap_or_else(FleetId::new),
        universe: request.universe,
        player: request.player,
        source: request.source,
        source_type: request.source_type,
        target: request.target,
        target_coordinates: request.target_coordinates,
        objective,
        acs: None,
        speed: request.speed,
        ships: merge_ships(request.ships)?,
        cargo: merge_cargo(request.cargo),
        created_at: now,
        arrival_time: now,
        deployment_time: 0,
        return_time: now,
        consumption: Vec::new(),
    })
}

fn merge_ships(ships: Vec<ShipInFleet>) -> Result<Vec<ShipInFleet>, FleetError> {
    let mut merged: Vec<ShipInFleet> = Vec::with_capacity(ships.len());
    for entry in ships {
        if let Some(existing) = merged.iter_mut().find(|s| s.ship == entry.ship) {
            existing.count = existing.count.checked_add(entry.count).ok_or_else(|| {
                FleetError::InvalidFleetStructure(format!("too many ships of type {}", entry.ship))
            })?;
        } else {
            merged.push(entry);
        }
    }
    Ok(merged)
}

fn merge_cargo(cargo: Vec<ResourceAmount>) -> Vec<ResourceAmount> {
    let mut merged: Vec<ResourceAmount> = Vec::with_capacity(cargo.len());
    for entry in cargo {
        if let Some(existing) = merged.iter_mut().find(|c| c.resource == entry.resource) {
            existing.amount = existing.amount.saturating_add(entry.amount);
        } else {
            merged.push(entry);
        }
    }
    merged
}

/// Largest amount of one resource a fleet may declare as cargo.
pub fn max_cargo_amount() -> Decimal {
    Decimal::from(u64::MAX)
}

/// Reject malformed fleets against the universe dimensions.
pub fn validate_structure(fleet: &Fleet, universe: &UniverseSnapshot) -> Result<(), FleetError> {
    if !universe.contains(&fleet.target_coordinates) {
        return Err(FleetError::InvalidFleetStructure(format!(
            "coordinates {} outside of universe",
            fleet.target_coordinates
        )));
    }
    if !fleet.source_type.can_launch_fleets() {
        return Err(FleetError::InvalidFleetStructure(
            "fleets leave from planets or moons".to_owned(),
        ));
    }
    if fleet.ships.is_empty() {
        return Err(FleetError::InvalidFleetStructure("no ships in fleet".to_owned()));
    }
    if let Some(empty) = fleet.ships.iter().find(|s| s.count == 0) {
        return Err(FleetError::InvalidFleetStructure(format!(
            "no ships of type {} requested",
            empty.ship
        )));
    }
    if fleet.cargo.iter().any(|c| c.amount <= Decimal::ZERO) {
        return Err(FleetError::InvalidFleetStructure(
            "cargo amounts must be positive".to_owned(),
        ));
    }
    let ceiling = max_cargo_amount();
    if let Some(entry) = fleet.cargo.iter().find(|c| c.amount > ceiling) {
        return Err(FleetError::InvalidFleetStructure(format!(
            "cargo amount of {} above {ceiling}",
            entry.resource
        )));
    }
    if fleet.target == Some(fleet.source) {
        return Err(FleetError::InvalidTarget);
    }
    validate_objective_shape(fleet)
}

/// Objective rules that only depend on the request.
fn validate_objective_shape(fleet: &Fleet) -> Result<(), FleetError> {
    let objective = fleet.objective;
    let location = fleet.target_coordinates.location;

    if objective.is_directed() && fleet.target.is_none() {
        return Err(invalid(objective, "needs a target"));
    }
    if !objective.is_directed() && fleet.target.is_some() {
        return Err(invalid(objective, "cannot name a target"));
    }
    match (objective, location) {
        (Purpose::Harvesting, LocationKind::Debris) => {}
        (Purpose::Harvesting, _) => return Err(invalid(objective, "needs a debris field")),
        (_, LocationKind::Debris) => return Err(invalid(objective, "cannot target debris")),
        (Purpose::Destroy, LocationKind::Planet) => return Err(invalid(objective, "needs a moon")),
        _ => {}
    }
    if objective == Purpose::AcsDefend && !fleet.cargo.is_empty() {
        return Err(invalid(objective, "cannot carry cargo"));
    }
    Ok(())
}

/// Extra checks for fleets sent through an ACS operation.
pub fn validate_acs_structure(fleet: &Fleet) -> Result<(), FleetError> {
    if !fleet.objective.is_group() {
        return Err(invalid(fleet.objective, "cannot be part of an ACS"));
    }
    if !fleet.cargo.is_empty() {
        return Err(invalid(fleet.objective, "ACS components carry no cargo"));
    }
    Ok(())
}

/// Check a freshly founded rendezvous before it is handed to storage.
pub fn validate_acs(acs: &AcsFleet, universe: &UniverseSnapshot) -> Result<(), FleetError> {
    if !acs.objective.is_group() {
        return Err(invalid(acs.objective, "cannot be part of an ACS"));
    }
    if acs.target.is_none() {
        return Err(invalid(acs.objective, "needs a target"));
    }
    if !universe.contains(&acs.target_coordinates) {
        return Err(FleetError::InvalidFleetStructure(format!(
            "coordinates {} outside of universe",
            acs.target_coordinates
        )));
    }
    Ok(())
}

pub(crate) fn invalid(objective: Purpose, reason: &str) -> FleetError {
    FleetError::InvalidObjective(format!("{objective} {reason}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use oglike_types::{Coordinate, PlanetId, PlayerId, ResourceId, ShipId, UniverseId};
    use rust_decimal_macros::dec;

    fn universe() -> UniverseSnapshot {
        UniverseSnapshot {
            id: UniverseId::new(),
            name: "Oberon".to_owned(),
            galaxies_count: 9,
            galaxy_size: 499,
            solar_system_size: 15,
        }
    }

    fn request(objective: Purpose) -> CreateFleetRequest {
        CreateFleetRequest {
            id: None,
            universe: UniverseId::new(),
            player: PlayerId::new(),
            source: PlanetId::new(),
            source_type: LocationKind::Planet,
            target: Some(PlanetId::new()),
            target_coordinates: Coordinate::new(0, 260, 7, LocationKind::Planet),
            objective: Some(objective),
            speed: 1.0,
            ships: vec![ShipInFleet {
                ship: ShipId::new(),
                count: 3,
            }],
            cargo: Vec::new(),
        }
    }

    fn fleet(objective: Purpose) -> Fleet {
        prepare(request(objective), Utc::now()).unwrap()
    }

    #[test]
    fn prepare_assigns_missing_id_and_keeps_given_one() {
        let given = FleetId::new();
        let mut req = request(Purpose::Attacking);
        req.id = Some(given);
        assert_eq!(prepare(req, Utc::now()).unwrap().id, given);

        let a = prepare(request(Purpose::Attacking), Utc::now()).unwrap();
        let b = prepare(request(Purpose::Attacking), Utc::now()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn prepare_requires_objective() {
        let mut req = request(Purpose::Attacking);
        req.objective = None;
        assert!(matches!(
            prepare(req, Utc::now()),
            Err(FleetError::InvalidFleetStructure(_))
        ));
    }

    #[test]
    fn duplicate_entries_are_merged_in_order() {
        let small = ShipId::new();
        let large = ShipId::new();
        let metal = ResourceId::new();
        let mut req = request(Purpose::Transport);
        req.ships = vec![
            ShipInFleet { ship: small, count: 2 },
            ShipInFleet { ship: large, count: 1 },
            ShipInFleet { ship: small, count: 5 },
        ];
        req.cargo = vec![
            ResourceAmount { resource: metal, amount: dec!(100) },
            ResourceAmount { resource: metal, amount: dec!(50) },
        ];
        let fleet = prepare(req, Utc::now()).unwrap();
        assert_eq!(
            fleet.ships,
            vec![
                ShipInFleet { ship: small, count: 7 },
                ShipInFleet { ship: large, count: 1 },
            ]
        );
        assert_eq!(fleet.cargo.len(), 1);
        assert_eq!(fleet.used_cargo(), Some(dec!(150)));
    }

    #[test]
    fn submission_time_is_kept_to_whole_seconds() {
        let now = Utc::now().with_nanosecond(750_000_000).unwrap();
        let fleet = prepare(request(Purpose::Attacking), now).unwrap();
        assert_eq!(fleet.created_at.nanosecond(), 0);
        assert_eq!(fleet.created_at.timestamp(), now.timestamp());
        assert_eq!(fleet.arrival_time, fleet.created_at);
    }

    #[test]
    fn cargo_above_ceiling_is_rejected() {
        let mut req = request(Purpose::Transport);
        let half = Decimal::MAX.checked_div(Decimal::TWO).unwrap();
        req.cargo = vec![
            ResourceAmount {
                resource: ResourceId::new(),
                amount: half.checked_add(Decimal::ONE).unwrap(),
            },
            ResourceAmount {
                resource: ResourceId::new(),
                amount: half.checked_add(Decimal::ONE).unwrap(),
            },
        ];
        let f = prepare(req, Utc::now()).unwrap();
        assert!(matches!(
            validate_structure(&f, &universe()),
            Err(FleetError::InvalidFleetStructure(_))
        ));
    }

    #[test]
    fn out_of_bounds_coordinates_are_rejected() {
        let mut f = fleet(Purpose::Attacking);
        f.target_coordinates.position = 15;
        assert!(matches!(
            validate_structure(&f, &universe()),
            Err(FleetError::InvalidFleetStructure(_))
        ));
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let mut f = fleet(Purpose::Attacking);
        f.ships.clear();
        assert!(matches!(
            validate_structure(&f, &universe()),
            Err(FleetError::InvalidFleetStructure(_))
        ));

        let mut f = fleet(Purpose::Attacking);
        f.ships[0].count = 0;
        assert!(matches!(
            validate_structure(&f, &universe()),
            Err(FleetError::InvalidFleetStructure(_))
        ));
    }

    #[test]
    fn fleet_cannot_target_its_source() {
        let mut f = fleet(Purpose::Transport);
        f.target = Some(f.source);
        assert!(matches!(
            validate_structure(&f, &universe()),
            Err(FleetError::InvalidTarget)
        ));
    }

    #[test]
    fn harvesting_needs_debris_and_no_target() {
        let mut f = fleet(Purpose::Harvesting);
        f.target = None;
        assert!(matches!(
            validate_structure(&f, &universe()),
            Err(FleetError::InvalidObjective(_))
        ));
        f.target_coordinates.location = LocationKind::Debris;
        assert!(validate_structure(&f, &universe()).is_ok());
        f.target = Some(PlanetId::new());
        assert!(validate_structure(&f, &universe()).is_err());
    }

    #[test]
    fn destroy_needs_a_moon() {
        let mut f = fleet(Purpose::Destroy);
        assert!(validate_structure(&f, &universe()).is_err());
        f.target_coordinates.location = LocationKind::Moon;
        assert!(validate_structure(&f, &universe()).is_ok());
    }

    #[test]
    fn acs_components_carry_nothing() {
        let mut f = fleet(Purpose::AcsAttack);
        assert!(validate_acs_structure(&f).is_ok());
        f.cargo.push(ResourceAmount {
            resource: ResourceId::new(),
            amount: dec!(1),
        });
        assert!(matches!(
            validate_acs_structure(&f),
            Err(FleetError::InvalidObjective(_))
        ));
        assert!(validate_acs_structure(&fleet(Purpose::Transport)).is_err());
    }
}
