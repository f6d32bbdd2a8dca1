//! Serialization of the read-validate-write window per universe.
//!
//! A recording repository marks the first read of a request as the window
//! start and the end of its write as the window end.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects
)]

mod common;

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use common::{World, at, submitted_at};
use oglike_fleet::{FleetError, FleetRepository, FleetService, InMemoryRepository, RepoResult, RepositoryError};
use oglike_types::{
    AcsFleet, AcsId, Coordinate, ExistingFleet, Fleet, FleetId, LocationKind, PlanetId,
    PlanetSnapshot, PlayerId, PlayerSnapshot, Purpose, ResourceDescription, ResourceId,
    ShipDescription, ShipId, ShipInFleet, UniverseId, UniverseMultipliers, UniverseSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Enter(UniverseId),
    Exit(UniverseId),
}

/// How the next writes fail, if at all.
#[derive(Debug, Clone, Copy)]
enum WriteFailure {
    Backend,
    Deduction,
    Conflict,
}

impl WriteFailure {
    fn error(self) -> RepositoryError {
        match self {
            Self::Backend => RepositoryError::Backend("connection reset".to_owned()),
            Self::Deduction => RepositoryError::Deduction("fighters drained".to_owned()),
            Self::Conflict => RepositoryError::Conflict("fleets_pkey".to_owned()),
        }
    }
}

struct RecordingRepository {
    inner: Arc<InMemoryRepository>,
    marks: Mutex<Vec<Mark>>,
    write_failure: Mutex<Option<WriteFailure>>,
}

impl RecordingRepository {
    fn new(inner: Arc<InMemoryRepository>) -> Self {
        Self {
            inner,
            marks: Mutex::new(Vec::new()),
            write_failure: Mutex::new(None),
        }
    }

    fn marks(&self) -> Vec<Mark> {
        self.marks.lock().unwrap().clone()
    }

    fn mark(&self, mark: Mark) {
        self.marks.lock().unwrap().push(mark);
    }

    fn fail_writes(&self, failure: Option<WriteFailure>) {
        *self.write_failure.lock().unwrap() = failure;
    }
}

impl FleetRepository for RecordingRepository {
    async fn universe(&self, id: UniverseId) -> RepoResult<Option<UniverseSnapshot>> {
        self.mark(Mark::Enter(id));
        // Widen the window so overlapping requests would be caught.
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.inner.universe(id).await
    }

    async fn multipliers(&self, id: UniverseId) -> RepoResult<Option<UniverseMultipliers>> {
        self.inner.multipliers(id).await
    }

    async fn planet(&self, id: PlanetId, kind: LocationKind) -> RepoResult<Option<PlanetSnapshot>> {
        self.inner.planet(id, kind).await
    }

    async fn player(&self, id: PlayerId) -> RepoResult<Option<PlayerSnapshot>> {
        self.inner.player(id).await
    }

    async fn ships(&self, ids: &[ShipId]) -> RepoResult<Vec<ShipDescription>> {
        self.inner.ships(ids).await
    }

    async fn resources(&self, ids: &[ResourceId]) -> RepoResult<Vec<ResourceDescription>> {
        self.inner.resources(ids).await
    }

    async fn debris_field_exists(
        &self,
        universe: UniverseId,
        coordinates: Coordinate,
    ) -> RepoResult<bool> {
        self.inner.debris_field_exists(universe, coordinates).await
    }

    async fn acs_fleet(&self, id: AcsId) -> RepoResult<Option<AcsFleet>> {
        self.inner.acs_fleet(id).await
    }

    async fn existing_fleet(&self, id: FleetId) -> RepoResult<Option<ExistingFleet>> {
        self.inner.existing_fleet(id).await
    }

    async fn persist_fleet(&self, fleet: &Fleet, acs: Option<&AcsFleet>) -> RepoResult<()> {
        let failure = *self.write_failure.lock().unwrap();
        let outcome = match failure {
            Some(failure) => Err(failure.error()),
            None => self.inner.persist_fleet(fleet, acs).await,
        };
        self.mark(Mark::Exit(fleet.universe));
        outcome
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_universe_windows_never_interleave() {
    let world = World::new();
    let repo = Arc::new(RecordingRepository::new(world.repo.clone()));
    let svc = FleetService::new(Arc::clone(&repo));

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let svc = svc.clone();
            let request = world.attack(1);
            tokio::spawn(async move { svc.create_at(request, submitted_at()).await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    let marks = repo.marks();
    assert_eq!(marks.len(), 12);
    for pair in marks.chunks(2) {
        assert_eq!(
            pair,
            [Mark::Enter(world.universe), Mark::Exit(world.universe)]
        );
    }
    assert_eq!(world.repo.fleet_count(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_universes_run_concurrently() {
    let world = World::new();
    let repo = Arc::new(RecordingRepository::new(world.repo.clone()));
    let svc = FleetService::new(Arc::clone(&repo));

    let attack = world.attack(1);
    let settle = oglike_types::CreateFleetRequest {
        universe: world.other_universe,
        player: world.stranger,
        source: world.rogue,
        target: None,
        target_coordinates: at(0, 300, 5),
        objective: Some(Purpose::Colonization),
        ships: vec![ShipInFleet {
            ship: world.colony_ship,
            count: 1,
        }],
        ..world.attack(1)
    };

    let first = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.create_at(attack, submitted_at()).await })
    };
    let second = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.create_at(settle, submitted_at()).await })
    };
    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());

    let marks = repo.marks();
    assert!(matches!(marks.first(), Some(Mark::Enter(_))));
    assert!(matches!(marks.get(1), Some(Mark::Enter(_))));
}

#[tokio::test]
async fn failed_write_leaves_nothing_and_releases_the_lock() {
    let world = World::new();
    let repo = Arc::new(RecordingRepository::new(world.repo.clone()));
    let svc = FleetService::new(Arc::clone(&repo));

    repo.fail_writes(Some(WriteFailure::Backend));
    let err = svc
        .create_at(world.attack(1), submitted_at())
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Storage(_)));
    assert_eq!(err.kind(), "storage_error");
    assert_eq!(world.repo.fleet_count(), 0);
    let home = world.repo.planet_state(world.home).unwrap();
    assert_eq!(home.ship_count(world.fighter), 100);

    repo.fail_writes(None);
    let retried = tokio::time::timeout(
        Duration::from_secs(1),
        svc.create_at(world.attack(1), submitted_at()),
    )
    .await;
    assert!(matches!(retried, Ok(Ok(_))));
}

#[tokio::test]
async fn refused_deduction_is_insufficient_resources() {
    let world = World::new();
    let repo = Arc::new(RecordingRepository::new(world.repo.clone()));
    let svc = FleetService::new(Arc::clone(&repo));

    repo.fail_writes(Some(WriteFailure::Deduction));
    let err = svc
        .create_at(world.attack(1), submitted_at())
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::InsufficientResources));
    assert_eq!(err.kind(), "insufficient_resources");
    assert_eq!(world.repo.fleet_count(), 0);
}

#[tokio::test]
async fn id_taken_at_write_time_is_a_duplicate() {
    let world = World::new();
    let repo = Arc::new(RecordingRepository::new(world.repo.clone()));
    let svc = FleetService::new(Arc::clone(&repo));

    repo.fail_writes(Some(WriteFailure::Conflict));
    let mut request = world.attack(1);
    request.id = Some(FleetId::new());
    let err = svc.create_at(request, submitted_at()).await.unwrap_err();
    assert!(matches!(err, FleetError::DuplicateFleet));
    assert_eq!(err.kind(), "duplicate_fleet");
}
