//! `Create` and `ACSCreate`: the engine entry points.
//!
//! Each call turns a wire request into a fleet, takes the lock of its
//! universe, validates against fresh snapshots, coordinates the rendezvous
//! when needed, and persists in a single write before the lock is
//! released. Nothing is written unless every check passed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oglike_types::{
    AcsId, AcsParticipation, CreateAcsFleetRequest, CreateFleetRequest, ExistingFleet, Fleet,
    FleetId, PlayerId, Purpose,
};
use tracing::{error, info, warn};

use crate::acs::{AcsCoordinator, validate_join};
use crate::error::FleetError;
use crate::lock::UniverseLocks;
use crate::repository::FleetRepository;
use crate::structure::{invalid, prepare, validate_acs_structure};
use crate::validator::FleetValidator;

/// Identifiers returned by a successful ACS dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcsCreated {
    /// The fleet component.
    pub fleet: FleetId,
    /// The rendezvous it belongs to.
    pub acs: AcsId,
}

/// Fleet creation service shared by all request handlers.
#[derive(Debug)]
pub struct FleetService<R> {
    repo: Arc<R>,
    locks: Arc<UniverseLocks>,
}

impl<R> Clone for FleetService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<R: FleetRepository> FleetService<R> {
    /// Service over `repo` with its own lock registry.
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_locks(repo, Arc::new(UniverseLocks::new()))
    }

    /// Service sharing an existing lock registry.
    pub const fn with_locks(repo: Arc<R>, locks: Arc<UniverseLocks>) -> Self {
        Self { repo, locks }
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Dispatch a fleet submitted now.
    pub async fn create(&self, request: CreateFleetRequest) -> Result<FleetId, FleetError> {
        self.create_at(request, Utc::now()).await
    }

    /// Dispatch a fleet submitted at `submitted_at`.
    pub async fn create_at(
        &self,
        request: CreateFleetRequest,
        submitted_at: DateTime<Utc>,
    ) -> Result<FleetId, FleetError> {
        let player = request.player;
        self.dispatch(request, submitted_at)
            .await
            .inspect_err(|err| report(player, err))
    }

    /// Found or join an ACS rendezvous with a fleet submitted now.
    pub async fn acs_create(&self, request: CreateAcsFleetRequest) -> Result<AcsCreated, FleetError> {
        self.acs_create_at(request, Utc::now()).await
    }

    /// Found or join an ACS rendezvous with a fleet submitted at
    /// `submitted_at`.
    pub async fn acs_create_at(
        &self,
        request: CreateAcsFleetRequest,
        submitted_at: DateTime<Utc>,
    ) -> Result<AcsCreated, FleetError> {
        let (request, participation) = request.into_parts();
        let player = request.player;
        self.dispatch_acs(request, participation, submitted_at)
            .await
            .inspect_err(|err| report(player, err))
    }

    async fn dispatch(
        &self,
        request: CreateFleetRequest,
        submitted_at: DateTime<Utc>,
    ) -> Result<FleetId, FleetError> {
        let replayable = request.id.is_some();
        let mut fleet = prepare(request, submitted_at)?;
        if fleet.objective == Purpose::AcsAttack {
            return Err(invalid(fleet.objective, "must be sent through an ACS"));
        }

        let _guard = self.locks.acquire(fleet.universe).await;
        if replayable {
            if let Some(existing) = self.replay(fleet.id, fleet.player).await? {
                info!(fleet_id = %existing.id, "Replayed fleet creation");
                return Ok(existing.id);
            }
        }

        FleetValidator::new(&*self.repo).validate(&mut fleet).await?;
        self.repo
            .persist_fleet(&fleet, None)
            .await
            .map_err(FleetError::from_write)?;
        created(&fleet);
        Ok(fleet.id)
    }

    async fn dispatch_acs(
        &self,
        request: CreateFleetRequest,
        participation: AcsParticipation,
        submitted_at: DateTime<Utc>,
    ) -> Result<AcsCreated, FleetError> {
        let replayable = request.id.is_some();
        let mut fleet = prepare(request, submitted_at)?;
        validate_acs_structure(&fleet)?;

        let _guard = self.locks.acquire(fleet.universe).await;
        if replayable {
            if let Some(existing) = self.replay(fleet.id, fleet.player).await? {
                let acs = existing.acs.ok_or(FleetError::DuplicateFleet)?;
                info!(fleet_id = %existing.id, acs_id = %acs, "Replayed ACS fleet creation");
                return Ok(AcsCreated {
                    fleet: existing.id,
                    acs,
                });
            }
        }

        let validation = FleetValidator::new(&*self.repo).validate(&mut fleet).await?;
        let mut acs = AcsCoordinator::new(&*self.repo)
            .fetch_or_create(&fleet, participation, &validation)
            .await?;
        validate_join(&mut acs, &mut fleet, &validation)?;

        self.repo
            .persist_fleet(&fleet, Some(&acs))
            .await
            .map_err(FleetError::from_write)?;
        created(&fleet);
        Ok(AcsCreated {
            fleet: fleet.id,
            acs: acs.id,
        })
    }

    /// Look up a client-chosen id. Another player's fleet under the same
    /// id is a collision.
    async fn replay(
        &self,
        id: FleetId,
        player: PlayerId,
    ) -> Result<Option<ExistingFleet>, FleetError> {
        match self.repo.existing_fleet(id).await? {
            Some(existing) if existing.player == player => Ok(Some(existing)),
            Some(_) => Err(FleetError::DuplicateFleet),
            None => Ok(None),
        }
    }
}

fn created(fleet: &Fleet) {
    info!(
        fleet_id = %fleet.id,
        universe_id = %fleet.universe,
        player_id = %fleet.player,
        objective = %fleet.objective,
        arrival_time = %fleet.arrival_time,
        acs_id = ?fleet.acs,
        "Fleet created"
    );
}

fn report(player: PlayerId, err: &FleetError) {
    if matches!(err, FleetError::Storage(_)) {
        error!(player_id = %player, kind = err.kind(), error = %err, "Fleet persistence failed");
    } else if err.is_suspicious() {
        warn!(player_id = %player, kind = err.kind(), error = %err, "Suspicious fleet request rejected");
    } else {
        info!(player_id = %player, kind = err.kind(), error = %err, "Fleet request rejected");
    }
}
