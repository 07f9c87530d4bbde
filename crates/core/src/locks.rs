// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Single-flight registry of stores with a scheduling run in progress.
#[derive(Debug, Default)]
pub struct StoreLocks {
    running: Mutex<HashSet<i64>>,
}

/// Releases a store's run slot when dropped.
#[derive(Debug)]
pub struct StoreLockGuard<'a> {
    locks: &'a StoreLocks,
    store_id: i64,
}

impl StoreLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the run slot for `store_id`.
    ///
    /// Returns `None` when a run for the store is already in progress.
    pub fn try_acquire(&self, store_id: i64) -> Option<StoreLockGuard<'_>> {
        if self.set().insert(store_id) {
            Some(StoreLockGuard {
                locks: self,
                store_id,
            })
        } else {
            None
        }
    }

    /// Returns whether a run for `store_id` is in progress.
    #[must_use]
    pub fn is_running(&self, store_id: i64) -> bool {
        self.set().contains(&store_id)
    }

    // A panic mid-run must not wedge the store forever.
    fn set(&self) -> MutexGuard<'_, HashSet<i64>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StoreLockGuard<'_> {
    #[must_use]
    pub const fn store_id(&self) -> i64 {
        self.store_id
    }
}

impl Drop for StoreLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.set().remove(&self.store_id);
    }
}
