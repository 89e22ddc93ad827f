//! Lock-free counters describing pool behaviour.
//!
//! Both pools carry a [`PoolStats`]. The counters are `Relaxed` atomics: they
//! are for dashboards and sanity checks, not for synchronization, so a
//! snapshot taken while other threads are acquiring may be a few events
//! behind.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters for a pool.
#[derive(Debug, Default)]
pub struct PoolStats {
    created: AtomicU64,
    acquired: AtomicU64,
    reused: AtomicU64,
    released: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolStatsSnapshot {
    /// Objects allocated by the pool over its lifetime.
    pub created: u64,
    /// Successful hand-outs.
    pub acquired: u64,
    /// Hand-outs served from the free list rather than a fresh allocation.
    pub reused: u64,
    /// Objects scrubbed and returned to the free list.
    pub released: u64,
}

impl PoolStatsSnapshot {
    /// Objects currently checked out.
    pub fn in_use(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

impl PoolStats {
    pub(crate) fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_acquired(&self, reused: bool) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        if reused {
            self.reused.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}
