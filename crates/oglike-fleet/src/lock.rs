//! Per-universe mutual exclusion.
//!
//! Every fleet creation runs its read-validate-write sequence while holding
//! the lock of its universe. Two requests on the same universe are strictly
//! serialized; requests on different universes never contend.
//!
//! Locks are created lazily on first use and dropped from the registry once
//! the last holder or waiter is gone, so the registry only ever contains
//! universes with in-flight requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use oglike_types::UniverseId;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

type Gate = Arc<tokio::sync::Mutex<()>>;

/// Registry of one async mutex per live universe.
#[derive(Debug, Default)]
pub struct UniverseLocks {
    gates: Mutex<HashMap<UniverseId, Gate>>,
}

impl UniverseLocks {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `universe` is free and hold it until the guard drops.
    ///
    /// No timeout and no re-entrancy: acquiring twice from the same task
    /// deadlocks.
    pub async fn acquire(self: &Arc<Self>, universe: UniverseId) -> UniverseGuard {
        let gate = Arc::clone(self.registry().entry(universe).or_default());
        debug!(universe_id = %universe, "Waiting for universe lock");
        let held = gate.lock_owned().await;
        debug!(universe_id = %universe, "Universe lock acquired");
        UniverseGuard {
            locks: Arc::clone(self),
            universe,
            held: Some(held),
        }
    }

    /// Number of universes with a holder or waiter.
    pub fn active(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<UniverseId, Gate>> {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, universe: UniverseId) {
        let mut gates = self.registry();
        // Only the registry holds the gate once nobody waits on it.
        if gates.get(&universe).is_some_and(|gate| Arc::strong_count(gate) == 1) {
            gates.remove(&universe);
        }
    }
}

/// Proof that the current request holds a universe.
#[derive(Debug)]
pub struct UniverseGuard {
    locks: Arc<UniverseLocks>,
    universe: UniverseId,
    held: Option<OwnedMutexGuard<()>>,
}

impl UniverseGuard {
    /// The universe held.
    pub const fn universe(&self) -> UniverseId {
        self.universe
    }
}

impl Drop for UniverseGuard {
    fn drop(&mut self) {
        // The owned guard keeps its gate alive; drop it before pruning.
        drop(self.held.take());
        self.locks.release(self.universe);
        debug!(universe_id = %self.universe, "Universe lock released");
    }
}
