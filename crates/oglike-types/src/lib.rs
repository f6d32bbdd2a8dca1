//! Shared type definitions for the `OGLike` fleet backend.
//!
//! This crate is the single source of truth for the values exchanged
//! between the fleet engine, its storage boundary, and the HTTP surface.
//! Client-facing types flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Location kinds and mission objectives
//! - [`structs`] -- Coordinates, fleets, and ACS rendezvous aggregates
//! - [`snapshots`] -- Read-only entity snapshots and catalog descriptions
//! - [`requests`] -- Wire request bodies for fleet creation

pub mod enums;
pub mod ids;
pub mod requests;
pub mod snapshots;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{LocationKind, Purpose};
pub use ids::{AcsId, FleetId, PlanetId, PlayerId, ResourceId, ShipId, TechnologyId, UniverseId};
pub use requests::{AcsParticipation, CreateAcsFleetRequest, CreateFleetRequest};
pub use snapshots::{
    ExistingFleet, PlanetSnapshot, PlayerSnapshot, Propulsion, ResourceDescription,
    ShipDescription, UniverseMultipliers, UniverseSnapshot,
};
pub use structs::{AcsFleet, Coordinate, Fleet, ResourceAmount, ShipInFleet};

#[cfg(test)]
mod tests {
    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UniverseId::export_all();
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::PlanetId::export_all();
        let _ = crate::ids::FleetId::export_all();
        let _ = crate::ids::AcsId::export_all();
        let _ = crate::ids::ShipId::export_all();
        let _ = crate::ids::ResourceId::export_all();
        let _ = crate::ids::TechnologyId::export_all();

        // Enums
        let _ = crate::enums::LocationKind::export_all();
        let _ = crate::enums::Purpose::export_all();

        // Structs
        let _ = crate::structs::Coordinate::export_all();
        let _ = crate::structs::ShipInFleet::export_all();
        let _ = crate::structs::ResourceAmount::export_all();
        let _ = crate::structs::Fleet::export_all();
        let _ = crate::structs::AcsFleet::export_all();
        let _ = crate::requests::CreateFleetRequest::export_all();
    }
}
