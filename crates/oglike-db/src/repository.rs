//! [`FleetRepository`] backed by `PostgreSQL`.

use oglike_fleet::{FleetRepository, RepoResult, RepositoryError};
use oglike_types::{
    AcsFleet, AcsId, Coordinate, ExistingFleet, Fleet, FleetId, LocationKind, PlanetId,
    PlanetSnapshot, PlayerId, PlayerSnapshot, ResourceDescription, ResourceId, ShipDescription,
    ShipId, UniverseId, UniverseMultipliers, UniverseSnapshot,
};

use crate::fleet_store::FleetStore;
use crate::postgres::PostgresPool;
use crate::snapshot_store::SnapshotStore;

/// The production repository: reads through [`SnapshotStore`], writes
/// through [`FleetStore`].
#[derive(Clone)]
pub struct PgFleetRepository {
    pool: PostgresPool,
}

impl PgFleetRepository {
    /// Wrap an open connection pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    fn snapshots(&self) -> SnapshotStore<'_> {
        SnapshotStore::new(self.pool.pool())
    }

    fn fleets(&self) -> FleetStore<'_> {
        FleetStore::new(self.pool.pool())
    }
}

impl FleetRepository for PgFleetRepository {
    async fn universe(&self, id: UniverseId) -> RepoResult<Option<UniverseSnapshot>> {
        Ok(self.snapshots().universe(id).await?)
    }

    async fn multipliers(&self, id: UniverseId) -> RepoResult<Option<UniverseMultipliers>> {
        Ok(self.snapshots().multipliers(id).await?)
    }

    async fn planet(&self, id: PlanetId, kind: LocationKind) -> RepoResult<Option<PlanetSnapshot>> {
        Ok(self.snapshots().body(id, kind).await?)
    }

    async fn player(&self, id: PlayerId) -> RepoResult<Option<PlayerSnapshot>> {
        Ok(self.snapshots().player(id).await?)
    }

    async fn ships(&self, ids: &[ShipId]) -> RepoResult<Vec<ShipDescription>> {
        Ok(self.snapshots().ships(ids).await?)
    }

    async fn resources(&self, ids: &[ResourceId]) -> RepoResult<Vec<ResourceDescription>> {
        Ok(self.snapshots().resources(ids).await?)
    }

    async fn debris_field_exists(
        &self,
        universe: UniverseId,
        coordinates: Coordinate,
    ) -> RepoResult<bool> {
        Ok(self
            .snapshots()
            .debris_field_exists(universe, coordinates)
            .await?)
    }

    async fn acs_fleet(&self, id: AcsId) -> RepoResult<Option<AcsFleet>> {
        Ok(self.fleets().acs_fleet(id).await?)
    }

    async fn existing_fleet(&self, id: FleetId) -> RepoResult<Option<ExistingFleet>> {
        Ok(self.fleets().existing_fleet(id).await?)
    }

    async fn persist_fleet(&self, fleet: &Fleet, acs: Option<&AcsFleet>) -> RepoResult<()> {
        self.fleets()
            .persist(fleet, acs)
            .await
            .map_err(RepositoryError::from)
    }
}
