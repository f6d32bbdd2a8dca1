//! Fleet creation and validation engine.
//!
//! Turns an untrusted dispatch request into a validated, persisted fleet.
//! Every request for a universe runs under that universe's lock so that no
//! two validations of the same universe interleave with each other's
//! writes.
//!
//! # Modules
//!
//! - [`arrival`] -- Distance, flight time, and fuel consumption
//! - [`structure`] -- Request preparation and static checks
//! - [`validator`] -- Snapshot-based validation of a single fleet
//! - [`acs`] -- ACS rendezvous founding and joining
//! - [`lock`] -- Per-universe lock registry
//! - [`repository`] -- Storage boundary trait
//! - [`service`] -- `Create` / `ACSCreate` orchestration
//! - [`memory`] -- In-memory repository
//! - [`error`] -- Rejection taxonomy

pub mod acs;
pub mod arrival;
pub mod error;
pub mod lock;
pub mod memory;
pub mod repository;
pub mod service;
pub mod structure;
pub mod validator;

pub use acs::AcsCoordinator;
pub use arrival::FlightPlan;
pub use error::{FleetError, RepositoryError};
pub use lock::{UniverseGuard, UniverseLocks};
pub use memory::InMemoryRepository;
pub use repository::{FleetRepository, RepoResult};
pub use service::{AcsCreated, FleetService};
pub use validator::{FleetValidator, Validation};
