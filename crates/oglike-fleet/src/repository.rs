//! The storage boundary consumed by the engine.
//!
//! Reads return `Ok(None)` when the entity does not exist and `Err` only
//! when the backend itself fails. The engine maps the former to the
//! matching `Invalid*` rejection and the latter to a storage error.
//! Writes happen exclusively through [`FleetRepository::persist_fleet`],
//! which must be all-or-nothing.

use std::future::Future;

use oglike_types::{
    AcsFleet, AcsId, Coordinate, ExistingFleet, Fleet, FleetId, LocationKind, PlanetId,
    PlanetSnapshot, PlayerId, PlayerSnapshot, ResourceDescription, ResourceId, ShipDescription,
    ShipId, UniverseId, UniverseMultipliers, UniverseSnapshot,
};

use crate::error::RepositoryError;

/// Result alias for repository calls.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Persistence boundary for fleet creation.
///
/// Implementations must be shareable across request tasks.
pub trait FleetRepository: Send + Sync + 'static {
    /// Dimensions of a universe.
    fn universe(
        &self,
        id: UniverseId,
    ) -> impl Future<Output = RepoResult<Option<UniverseSnapshot>>> + Send;

    /// Balance multipliers of a universe.
    fn multipliers(
        &self,
        id: UniverseId,
    ) -> impl Future<Output = RepoResult<Option<UniverseMultipliers>>> + Send;

    /// A planet or moon. `kind` disambiguates which table the id refers to.
    fn planet(
        &self,
        id: PlanetId,
        kind: LocationKind,
    ) -> impl Future<Output = RepoResult<Option<PlanetSnapshot>>> + Send;

    /// A player account.
    fn player(&self, id: PlayerId)
    -> impl Future<Output = RepoResult<Option<PlayerSnapshot>>> + Send;

    /// Catalog entries for the given ship types. Unknown ids are omitted.
    fn ships(&self, ids: &[ShipId]) -> impl Future<Output = RepoResult<Vec<ShipDescription>>> + Send;

    /// Catalog entries for the given resources. Unknown ids are omitted.
    fn resources(
        &self,
        ids: &[ResourceId],
    ) -> impl Future<Output = RepoResult<Vec<ResourceDescription>>> + Send;

    /// Whether a debris field floats at the given position.
    fn debris_field_exists(
        &self,
        universe: UniverseId,
        coordinates: Coordinate,
    ) -> impl Future<Output = RepoResult<bool>> + Send;

    /// An ACS rendezvous with its current members.
    fn acs_fleet(&self, id: AcsId) -> impl Future<Output = RepoResult<Option<AcsFleet>>> + Send;

    /// A previously accepted fleet, for idempotent replays.
    fn existing_fleet(
        &self,
        id: FleetId,
    ) -> impl Future<Output = RepoResult<Option<ExistingFleet>>> + Send;

    /// Write a validated fleet and, for ACS members, its rendezvous.
    ///
    /// One transaction: the rendezvous (inserted when new, agreed arrival
    /// refreshed otherwise), the fleet with ships, cargo, consumption, the
    /// membership link, and the deduction of ships, cargo, and fuel from
    /// the source. Any failure leaves storage untouched.
    fn persist_fleet(
        &self,
        fleet: &Fleet,
        acs: Option<&AcsFleet>,
    ) -> impl Future<Output = RepoResult<()>> + Send;
}
