//! `PostgreSQL` storage for the OGLike fleet engine.
//!
//! # Architecture
//!
//! ```text
//! FleetService
//!     |
//!     +-- PgFleetRepository (FleetRepository)
//!         |-- SnapshotStore   (universes, catalogs, planet inventories)
//!         +-- FleetStore      (fleets, ACS rendezvous, deductions)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, and migrations
//! - [`snapshot_store`] -- read-side queries used during validation
//! - [`fleet_store`] -- transactional fleet persistence
//! - [`repository`] -- the [`FleetRepository`](oglike_fleet::FleetRepository) implementation
//! - [`rows`] -- row types and column conversions
//! - [`error`] -- shared error types

pub mod error;
pub mod fleet_store;
pub mod postgres;
pub mod repository;
pub mod rows;
pub mod snapshot_store;

pub use error::DbError;
pub use fleet_store::FleetStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use repository::PgFleetRepository;
pub use snapshot_store::SnapshotStore;
