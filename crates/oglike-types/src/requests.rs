//! Wire request types accepted by the fleet endpoints.
//!
//! Optional fields are explicit `Option`s. The engine never guesses intent
//! from an empty string.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LocationKind, Purpose};
use crate::ids::{AcsId, FleetId, PlanetId, PlayerId, UniverseId};
use crate::structs::{Coordinate, ResourceAmount, ShipInFleet};

/// A request to dispatch a fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateFleetRequest {
    /// Client-chosen id, used as an idempotency key when present.
    #[serde(default)]
    pub id: Option<FleetId>,
    /// Universe the fleet flies in.
    pub universe: UniverseId,
    /// Player issuing the dispatch.
    pub player: PlayerId,
    /// Planet or moon the fleet leaves from.
    pub source: PlanetId,
    /// Whether the source is a planet or a moon.
    pub source_type: LocationKind,
    /// Target entity, omitted for coordinate-only missions.
    #[serde(default)]
    pub target: Option<PlanetId>,
    /// Destination coordinates.
    pub target_coordinates: Coordinate,
    /// Mission of the fleet. Required, rejected when missing.
    #[serde(default)]
    pub objective: Option<Purpose>,
    /// Fraction of the maximum speed.
    pub speed: f64,
    /// Ships to send.
    pub ships: Vec<ShipInFleet>,
    /// Resources to carry.
    #[serde(default)]
    pub cargo: Vec<ResourceAmount>,
}

/// A request to found or join an ACS rendezvous.
///
/// Same body as [`CreateFleetRequest`] with an optional `acs` reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAcsFleetRequest {
    /// The fleet component.
    #[serde(flatten)]
    pub fleet: CreateFleetRequest,
    /// Rendezvous to join. Omitted to found a new one.
    #[serde(default)]
    pub acs: Option<AcsId>,
}

/// How a fleet takes part in an ACS operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcsParticipation {
    /// Start a new rendezvous with this fleet as founding member.
    Found,
    /// Join the named rendezvous.
    Join(AcsId),
}

impl CreateAcsFleetRequest {
    /// Split the wire body into the fleet request and an explicit role.
    pub fn into_parts(self) -> (CreateFleetRequest, AcsParticipation) {
        let participation = self
            .acs
            .map_or(AcsParticipation::Found, AcsParticipation::Join);
        (self.fleet, participation)
    }
}
