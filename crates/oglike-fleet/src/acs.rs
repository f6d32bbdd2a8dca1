//! ACS rendezvous coordination.
//!
//! An ACS operation gathers fleets from several players on one target at
//! one agreed arrival time. The first fleet founds the rendezvous and sets
//! the agreed time. Later fleets must be able to arrive no later than that
//! time; they keep the agreed arrival and hold at the rendezvous for the
//! difference, burning extra fuel while they wait.

use oglike_types::{AcsFleet, AcsId, AcsParticipation, Fleet};
use tracing::debug;

use crate::error::FleetError;
use crate::repository::FleetRepository;
use crate::structure::validate_acs;
use crate::validator::Validation;

/// Locates or creates the rendezvous a fleet takes part in.
#[derive(Debug)]
pub struct AcsCoordinator<'a, R> {
    repo: &'a R,
}

impl<'a, R: FleetRepository> AcsCoordinator<'a, R> {
    /// Coordinator reading through `repo`.
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Resolve the rendezvous named by `participation`.
    ///
    /// A founded rendezvous is built from the fleet and left unsaved: it is
    /// written together with the fleet.
    pub async fn fetch_or_create(
        &self,
        fleet: &Fleet,
        participation: AcsParticipation,
        validation: &Validation,
    ) -> Result<AcsFleet, FleetError> {
        match participation {
            AcsParticipation::Found => {
                let acs = AcsFleet {
                    id: AcsId::new(),
                    universe: fleet.universe,
                    objective: fleet.objective,
                    target: fleet.target,
                    target_coordinates: fleet.target_coordinates,
                    members: Vec::new(),
                    arrival_time: None,
                };
                validate_acs(&acs, &validation.universe)?;
                debug!(acs_id = %acs.id, fleet_id = %fleet.id, "Founding ACS");
                Ok(acs)
            }
            AcsParticipation::Join(id) => self
                .repo
                .acs_fleet(id)
                .await?
                .ok_or(FleetError::UnknownAcs),
        }
    }
}

/// Check `fleet` against the rendezvous and bind them together.
///
/// The founding member sets the agreed arrival time. Any other member keeps
/// it and gets a deployment time equal to how early it would have arrived.
pub fn validate_join(
    acs: &mut AcsFleet,
    fleet: &mut Fleet,
    validation: &Validation,
) -> Result<(), FleetError> {
    if acs.universe != fleet.universe
        || acs.objective != fleet.objective
        || acs.target != fleet.target
        || acs.target_coordinates != fleet.target_coordinates
    {
        return Err(FleetError::AcsMismatch);
    }

    let unconstrained = fleet.arrival_time;
    match acs.arrival_time.filter(|_| !acs.is_unfounded()) {
        None => {
            acs.arrival_time = Some(unconstrained);
            fleet.deployment_time = 0;
        }
        Some(agreed) => {
            if unconstrained > agreed {
                return Err(FleetError::AcsArrivalTooLate);
            }
            let holding = agreed.signed_duration_since(unconstrained).num_seconds();
            fleet.arrival_time = agreed;
            fleet.return_time = validation.plan.arrival_from(agreed).ok_or_else(|| {
                FleetError::InvalidFleetStructure("flight time out of range".to_owned())
            })?;
            fleet.deployment_time = holding;
            validation.refuel(fleet, holding)?;
        }
    }

    fleet.acs = Some(acs.id);
    if !acs.members.contains(&fleet.id) {
        acs.members.push(fleet.id);
    }
    debug!(
        acs_id = %acs.id,
        fleet_id = %fleet.id,
        deployment_time = fleet.deployment_time,
        members = acs.members.len(),
        "Fleet joined ACS"
    );
    Ok(())
}
