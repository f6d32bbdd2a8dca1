//! Shared universe fixture for the engine integration suites.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use oglike_fleet::InMemoryRepository;
use oglike_types::{
    Coordinate, CreateFleetRequest, LocationKind, PlanetId, PlanetSnapshot, PlayerId,
    PlayerSnapshot, Propulsion, Purpose, ResourceAmount, ResourceDescription, ResourceId,
    ShipDescription, ShipId, ShipInFleet, TechnologyId, UniverseId, UniverseMultipliers,
    UniverseSnapshot,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A small populated universe.
///
/// - `attacker` owns `home` at 0:1:4, its moon, and `colony` at 0:3:8
/// - `defender` owns `target` at 0:260:7 and `target_moon`
/// - `ally` owns `outpost` at 0:255:3 and `far_outpost` at 2:260:7
/// - `stranger` lives in `other_universe` but owns `rogue` at 0:300:1
pub struct World {
    pub repo: Arc<InMemoryRepository>,
    pub universe: UniverseId,
    pub other_universe: UniverseId,

    pub metal: ResourceId,
    pub deuterium: ResourceId,
    pub energy: ResourceId,

    pub fighter: ShipId,
    pub cargo_ship: ShipId,
    pub recycler: ShipId,
    pub colony_ship: ShipId,

    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub ally: PlayerId,
    pub stranger: PlayerId,

    pub home: PlanetId,
    pub home_moon: PlanetId,
    pub colony: PlanetId,
    pub target: PlanetId,
    pub target_moon: PlanetId,
    pub outpost: PlanetId,
    pub far_outpost: PlanetId,
    pub rogue: PlanetId,
}

pub fn at(galaxy: u32, system: u32, position: u32) -> Coordinate {
    Coordinate::new(galaxy, system, position, LocationKind::Planet)
}

pub fn moon_at(galaxy: u32, system: u32, position: u32) -> Coordinate {
    Coordinate::new(galaxy, system, position, LocationKind::Moon)
}

/// Fixed submission instant so timing assertions are exact.
pub fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn dimensions(id: UniverseId, name: &str) -> UniverseSnapshot {
    UniverseSnapshot {
        id,
        name: name.to_owned(),
        galaxies_count: 9,
        galaxy_size: 499,
        solar_system_size: 15,
    }
}

fn ship(
    name: &str,
    cargo: u64,
    base_speed: u32,
    propulsion: Option<Propulsion>,
    fuel: (ResourceId, Decimal, Decimal),
    objectives: &[Purpose],
) -> ShipDescription {
    ShipDescription {
        id: ShipId::new(),
        name: name.to_owned(),
        cargo,
        base_speed,
        propulsion,
        fuel: BTreeMap::from([(fuel.0, fuel.1)]),
        holding_cost: BTreeMap::from([(fuel.0, fuel.2)]),
        objectives: objectives.iter().copied().collect::<BTreeSet<_>>(),
    }
}

impl World {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let universe = UniverseId::new();
        let other_universe = UniverseId::new();
        repo.insert_universe(dimensions(universe, "Oberon"), UniverseMultipliers::default());
        repo.insert_universe(
            dimensions(other_universe, "Titania"),
            UniverseMultipliers::default(),
        );

        let metal = ResourceId::new();
        let deuterium = ResourceId::new();
        let energy = ResourceId::new();
        for (id, name, movable) in [
            (metal, "metal", true),
            (deuterium, "deuterium", true),
            (energy, "energy", false),
        ] {
            repo.insert_resource(ResourceDescription {
                id,
                name: name.to_owned(),
                movable,
            });
        }

        let combustion = TechnologyId::new();
        let fighter = ship(
            "light fighter",
            100,
            12_500,
            None,
            (deuterium, dec!(5), dec!(2)),
            &[
                Purpose::Attacking,
                Purpose::AcsAttack,
                Purpose::AcsDefend,
                Purpose::Transport,
                Purpose::Deployment,
            ],
        );
        let cargo_ship = ship(
            "small cargo",
            5_000,
            5_000,
            Some(Propulsion {
                technology: combustion,
                increase_per_level: 0.1,
            }),
            (deuterium, dec!(10), dec!(1)),
            &[
                Purpose::Transport,
                Purpose::Deployment,
                Purpose::AcsDefend,
            ],
        );
        let recycler = ship(
            "recycler",
            20_000,
            2_000,
            None,
            (deuterium, dec!(300), dec!(30)),
            &[Purpose::Harvesting, Purpose::Transport],
        );
        let colony_ship = ship(
            "colony ship",
            7_500,
            2_500,
            None,
            (deuterium, dec!(1000), dec!(100)),
            &[Purpose::Colonization, Purpose::Transport],
        );
        let ids = (fighter.id, cargo_ship.id, recycler.id, colony_ship.id);
        for s in [fighter, cargo_ship, recycler, colony_ship] {
            repo.insert_ship(s);
        }
        let (fighter, cargo_ship, recycler, colony_ship) = ids;

        let attacker = PlayerId::new();
        let defender = PlayerId::new();
        let ally = PlayerId::new();
        let stranger = PlayerId::new();
        for (id, home, name) in [
            (attacker, universe, "attacker"),
            (defender, universe, "defender"),
            (ally, universe, "ally"),
            (stranger, other_universe, "stranger"),
        ] {
            repo.insert_player(PlayerSnapshot {
                id,
                universe: home,
                name: name.to_owned(),
            });
        }

        let stationed = BTreeMap::from([
            (fighter, 100),
            (cargo_ship, 50),
            (recycler, 10),
            (colony_ship, 2),
        ]);
        let stock = BTreeMap::from([
            (metal, dec!(1_000_000)),
            (deuterium, dec!(1_000_000)),
            (energy, dec!(500)),
        ]);
        let planet = |owner: PlayerId, coordinates: Coordinate, techs: BTreeMap<TechnologyId, u32>| {
            let planet = PlanetSnapshot {
                id: PlanetId::new(),
                player: Some(owner),
                coordinates,
                ships: stationed.clone(),
                resources: stock.clone(),
                technologies: techs,
            };
            let id = planet.id;
            repo.insert_planet(planet);
            id
        };

        let trained = BTreeMap::from([(combustion, 6)]);
        let home = planet(attacker, at(0, 1, 4), trained.clone());
        let home_moon = planet(attacker, moon_at(0, 1, 4), trained.clone());
        let colony = planet(attacker, at(0, 3, 8), trained);
        let target = planet(defender, at(0, 260, 7), BTreeMap::new());
        let target_moon = planet(defender, moon_at(0, 260, 7), BTreeMap::new());
        let outpost = planet(ally, at(0, 255, 3), BTreeMap::new());
        let far_outpost = planet(ally, at(2, 260, 7), BTreeMap::new());
        let rogue = planet(stranger, at(0, 300, 1), BTreeMap::new());

        Self {
            repo,
            universe,
            other_universe,
            metal,
            deuterium,
            energy,
            fighter,
            cargo_ship,
            recycler,
            colony_ship,
            attacker,
            defender,
            ally,
            stranger,
            home,
            home_moon,
            colony,
            target,
            target_moon,
            outpost,
            far_outpost,
            rogue,
        }
    }

    /// Attack the defender's planet with `count` fighters from `home`.
    pub fn attack(&self, count: u32) -> CreateFleetRequest {
        CreateFleetRequest {
            id: None,
            universe: self.universe,
            player: self.attacker,
            source: self.home,
            source_type: LocationKind::Planet,
            target: Some(self.target),
            target_coordinates: at(0, 260, 7),
            objective: Some(Purpose::Attacking),
            speed: 1.0,
            ships: vec![ShipInFleet {
                ship: self.fighter,
                count,
            }],
            cargo: Vec::new(),
        }
    }

    /// An ACS attack component from `source`, owned by `player`.
    pub fn acs_attack(&self, player: PlayerId, source: PlanetId) -> CreateFleetRequest {
        CreateFleetRequest {
            player,
            source,
            objective: Some(Purpose::AcsAttack),
            ships: vec![ShipInFleet {
                ship: self.fighter,
                count: 5,
            }],
            ..self.attack(5)
        }
    }

    pub fn cargo(&self, resource: ResourceId, amount: Decimal) -> ResourceAmount {
        ResourceAmount { resource, amount }
    }
}
