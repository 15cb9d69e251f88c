//! Per-run entity deduplication
//!
//! Players appear in many games. The first game unit to claim an entity id downloads
//! its file; every later claim for the same id in the same run is refused.

use crate::types::EntityId;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared claim set, cloned into every worker (clones share the same set)
#[derive(Clone, Debug, Default)]
pub struct EntityDeduplicator {
    claimed: Arc<Mutex<HashSet<EntityId>>>,
}

impl EntityDeduplicator {
    /// Create an empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for this run
    ///
    /// Returns `true` exactly once per id: the check and the insert happen under one
    /// lock acquisition, so two workers can never both win the same id.
    pub fn try_claim(&self, id: EntityId) -> bool {
        self.lock().insert(id)
    }

    /// Whether `id` has been claimed
    pub fn is_claimed(&self, id: EntityId) -> bool {
        self.lock().contains(&id)
    }

    /// Number of claimed ids
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of the claimed ids
    pub fn snapshot(&self) -> BTreeSet<EntityId> {
        self.lock().iter().copied().collect()
    }

    // A panic while holding the lock cannot leave the set half-updated
    // (insert is a single call), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashSet<EntityId>> {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
