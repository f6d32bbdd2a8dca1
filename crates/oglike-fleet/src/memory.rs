//! In-process [`FleetRepository`] backed by hash maps.
//!
//! Used by the engine and HTTP test suites. Writes are applied to a copy of
//! the source planet first so a failed deduction leaves nothing behind,
//! mirroring the transactional contract of the database implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use oglike_types::{
    AcsFleet, AcsId, Coordinate, ExistingFleet, Fleet, FleetId, LocationKind, PlanetId,
    PlanetSnapshot, PlayerId, PlayerSnapshot, ResourceDescription, ResourceId, ShipDescription,
    ShipId, UniverseId, UniverseMultipliers, UniverseSnapshot,
};
use rust_decimal::Decimal;

use crate::error::RepositoryError;
use crate::repository::{FleetRepository, RepoResult};

type Position = (UniverseId, u32, u32, u32);

#[derive(Debug, Default)]
struct State {
    universes: HashMap<UniverseId, UniverseSnapshot>,
    multipliers: HashMap<UniverseId, UniverseMultipliers>,
    planets: HashMap<PlanetId, PlanetSnapshot>,
    players: HashMap<PlayerId, PlayerSnapshot>,
    ships: HashMap<ShipId, ShipDescription>,
    resources: HashMap<ResourceId, ResourceDescription>,
    debris: HashSet<Position>,
    acs: HashMap<AcsId, AcsFleet>,
    fleets: HashMap<FleetId, Fleet>,
}

/// Hash-map storage for tests and local experiments.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a universe and its multipliers.
    pub fn insert_universe(&self, universe: UniverseSnapshot, multipliers: UniverseMultipliers) {
        let mut state = self.write();
        state.multipliers.insert(universe.id, multipliers);
        state.universes.insert(universe.id, universe);
    }

    /// Register or replace a planet or moon.
    pub fn insert_planet(&self, planet: PlanetSnapshot) {
        self.write().planets.insert(planet.id, planet);
    }

    /// Register a player.
    pub fn insert_player(&self, player: PlayerSnapshot) {
        self.write().players.insert(player.id, player);
    }

    /// Add a ship type to the catalog.
    pub fn insert_ship(&self, ship: ShipDescription) {
        self.write().ships.insert(ship.id, ship);
    }

    /// Add a resource to the catalog.
    pub fn insert_resource(&self, resource: ResourceDescription) {
        self.write().resources.insert(resource.id, resource);
    }

    /// Spawn a debris field at a position.
    pub fn insert_debris_field(&self, universe: UniverseId, coordinates: Coordinate) {
        self.write().debris.insert(position(universe, &coordinates));
    }

    /// A persisted fleet.
    pub fn fleet(&self, id: FleetId) -> Option<Fleet> {
        self.read().fleets.get(&id).cloned()
    }

    /// A persisted rendezvous.
    pub fn acs(&self, id: AcsId) -> Option<AcsFleet> {
        self.read().acs.get(&id).cloned()
    }

    /// Current state of a planet or moon.
    pub fn planet_state(&self, id: PlanetId) -> Option<PlanetSnapshot> {
        self.read().planets.get(&id).cloned()
    }

    /// Number of persisted fleets.
    pub fn fleet_count(&self) -> usize {
        self.read().fleets.len()
    }
}

const fn position(universe: UniverseId, coordinates: &Coordinate) -> Position {
    (
        universe,
        coordinates.galaxy,
        coordinates.system,
        coordinates.position,
    )
}

/// Remove what `fleet` takes away from `planet`.
fn deduct(planet: &mut PlanetSnapshot, fleet: &Fleet) -> RepoResult<()> {
    for entry in &fleet.ships {
        let stationed = planet.ships.entry(entry.ship).or_insert(0);
        *stationed = stationed.checked_sub(entry.count).ok_or_else(|| {
            RepositoryError::Deduction(format!("not enough ships of type {}", entry.ship))
        })?;
    }
    for entry in fleet.cargo.iter().chain(&fleet.consumption) {
        let stock = planet.resources.entry(entry.resource).or_insert(Decimal::ZERO);
        let left = stock.saturating_sub(entry.amount);
        if left < Decimal::ZERO {
            return Err(RepositoryError::Deduction(format!(
                "not enough of resource {}",
                entry.resource
            )));
        }
        *stock = left;
    }
    Ok(())
}

impl FleetRepository for InMemoryRepository {
    async fn universe(&self, id: UniverseId) -> RepoResult<Option<UniverseSnapshot>> {
        Ok(self.read().universes.get(&id).cloned())
    }

    async fn multipliers(&self, id: UniverseId) -> RepoResult<Option<UniverseMultipliers>> {
        Ok(self.read().multipliers.get(&id).copied())
    }

    async fn planet(&self, id: PlanetId, kind: LocationKind) -> RepoResult<Option<PlanetSnapshot>> {
        Ok(self
            .read()
            .planets
            .get(&id)
            .filter(|p| p.coordinates.location == kind)
            .cloned())
    }

    async fn player(&self, id: PlayerId) -> RepoResult<Option<PlayerSnapshot>> {
        Ok(self.read().players.get(&id).cloned())
    }

    async fn ships(&self, ids: &[ShipId]) -> RepoResult<Vec<ShipDescription>> {
        let state = self.read();
        Ok(ids.iter().filter_map(|id| state.ships.get(id).cloned()).collect())
    }

    async fn resources(&self, ids: &[ResourceId]) -> RepoResult<Vec<ResourceDescription>> {
        let state = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.resources.get(id).cloned())
            .collect())
    }

    async fn debris_field_exists(
        &self,
        universe: UniverseId,
        coordinates: Coordinate,
    ) -> RepoResult<bool> {
        Ok(self.read().debris.contains(&position(universe, &coordinates)))
    }

    async fn acs_fleet(&self, id: AcsId) -> RepoResult<Option<AcsFleet>> {
        Ok(self.read().acs.get(&id).cloned())
    }

    async fn existing_fleet(&self, id: FleetId) -> RepoResult<Option<ExistingFleet>> {
        Ok(self.read().fleets.get(&id).map(|f| ExistingFleet {
            id: f.id,
            player: f.player,
            acs: f.acs,
        }))
    }

    async fn persist_fleet(&self, fleet: &Fleet, acs: Option<&AcsFleet>) -> RepoResult<()> {
        let mut state = self.write();
        if state.fleets.contains_key(&fleet.id) {
            return Err(RepositoryError::Conflict(format!("fleet {} exists", fleet.id)));
        }

        let mut source = state
            .planets
            .get(&fleet.source)
            .cloned()
            .ok_or_else(|| RepositoryError::Deduction(format!("source {} vanished", fleet.source)))?;
        deduct(&mut source, fleet)?;

        state.planets.insert(source.id, source);
        if let Some(acs) = acs {
            state.acs.insert(acs.id, acs.clone());
        }
        state.fleets.insert(fleet.id, fleet.clone());
        Ok(())
    }
}
