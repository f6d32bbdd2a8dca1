//! Shared application state for the fleet API.

use std::sync::Arc;

use oglike_fleet::{FleetRepository, FleetService};

/// State handed to every handler.
pub struct AppState<R> {
    /// The fleet engine.
    pub fleets: FleetService<R>,
}

impl<R: FleetRepository> AppState<R> {
    /// Build the state around a repository, with a fresh lock registry.
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            fleets: FleetService::new(repo),
        }
    }
}
