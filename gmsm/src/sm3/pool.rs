//! # SM3 Hasher Pool
//!
//! Reusable SM3 states. A state handed out by [`HasherPool::acquire`] is
//! always indistinguishable from a fresh one, and a state that goes back is
//! reset first, so nothing from one caller's input can reach the next
//! caller's digest.
//!
//! Acquisition can't fail: an empty free list just means a new state.

use std::fmt;
use std::mem;

use ::sm3::digest::{Digest, Reset};
use ::sm3::Sm3;
use parking_lot::Mutex;
use tracing::debug;

use crate::stats::PoolStats;

use super::writer::Sm3Writer;
use super::Sm3Digest;

/// Concurrency-safe pool of SM3 states.
#[derive(Default)]
pub struct HasherPool {
    free: Mutex<Vec<Sm3>>,
    stats: PoolStats,
}

impl HasherPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool with `n` states allocated up front.
    pub fn with_capacity(n: usize) -> Self {
        let pool = Self::new();
        {
            let mut free = pool.free.lock();
            free.reserve(n);
            for _ in 0..n {
                pool.stats.record_created();
                free.push(Sm3::default());
            }
        }
        if n > 0 {
            debug!(states = n, "hasher pool pre-warmed");
        }
        pool
    }

    /// Borrow a reset state.
    pub fn acquire(&self) -> PooledHasher<'_> {
        let popped = self.free.lock().pop();
        let reused = popped.is_some();
        let state = popped.unwrap_or_else(|| {
            self.stats.record_created();
            debug!("hasher pool allocated state");
            Sm3::default()
        });
        self.stats.record_acquired(reused);
        PooledHasher { pool: self, state }
    }

    /// One-shot digest through a pooled state.
    pub fn sum(&self, data: &[u8]) -> Sm3Digest {
        let mut hasher = self.acquire();
        hasher.update(data);
        hasher.finalize_reset()
    }

    /// An incremental writer backed by a pooled state.
    pub fn writer(&self) -> Sm3Writer<'_> {
        Sm3Writer::new(self.acquire())
    }

    /// Acquire/release counters.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// States currently sitting in the free list.
    pub fn idle_count(&self) -> usize {
        self.free.lock().len()
    }

    fn recycle(&self, state: Sm3) {
        self.free.lock().push(state);
        self.stats.record_released();
    }
}

impl fmt::Debug for HasherPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasherPool")
            .field("idle", &self.idle_count())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// An SM3 state on loan from a [`HasherPool`]. Reset and returned on drop.
pub struct PooledHasher<'a> {
    pool: &'a HasherPool,
    state: Sm3,
}

impl PooledHasher<'_> {
    /// Absorb more input.
    pub fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.state, data);
    }

    /// Digest of everything absorbed so far. Does not consume the state, so
    /// more input can follow.
    pub fn sum(&self) -> Sm3Digest {
        self.state.clone().finalize().into()
    }

    /// Digest of everything absorbed so far, then start over.
    pub fn finalize_reset(&mut self) -> Sm3Digest {
        Digest::finalize_reset(&mut self.state).into()
    }

    /// Discard all absorbed input.
    pub fn reset(&mut self) {
        Digest::reset(&mut self.state);
    }

    /// Hand the state back. Same as dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PooledHasher<'_> {
    fn drop(&mut self) {
        let mut state = mem::take(&mut self.state);
        Reset::reset(&mut state);
        self.pool.recycle(state);
    }
}

impl fmt::Debug for PooledHasher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PooledHasher(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_DIGEST: &str = "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0";

    #[test]
    fn test_sum_known_vector() {
        let pool = HasherPool::new();
        assert_eq!(hex::encode(pool.sum(b"abc")), ABC_DIGEST);
    }

    #[test]
    fn test_sum_is_deterministic_and_reuses_state() {
        let pool = HasherPool::new();
        let a = pool.sum(b"pooled input");
        let b = pool.sum(b"pooled input");
        assert_eq!(a, b);

        let snap = pool.stats().snapshot();
        assert_eq!(snap.created, 1);
        assert_eq!(snap.reused, 1);
        assert_eq!(snap.in_use(), 0);
    }

    #[test]
    fn test_abandoned_input_does_not_leak() {
        let pool = HasherPool::new();
        let mut h = pool.acquire();
        h.update(b"first caller's half-finished secret");
        h.release();

        // Same state, new caller.
        let mut h = pool.acquire();
        h.update(b"abc");
        assert_eq!(hex::encode(h.sum()), ABC_DIGEST);
        assert_eq!(pool.stats().snapshot().created, 1);
    }

    #[test]
    fn test_sum_snapshot_does_not_finalize() {
        let pool = HasherPool::new();
        let mut h = pool.acquire();
        h.update(b"ab");
        let partial = h.sum();
        assert_eq!(partial, h.sum());
        h.update(b"c");
        assert_eq!(hex::encode(h.finalize_reset()), ABC_DIGEST);
        // finalize_reset leaves a fresh state behind.
        let empty: Sm3Digest = Sm3::digest(b"").into();
        assert_eq!(h.sum(), empty);
    }

    #[test]
    fn test_reset_discards_input() {
        let pool = HasherPool::new();
        let mut h = pool.acquire();
        h.update(b"garbage");
        h.reset();
        h.update(b"abc");
        assert_eq!(hex::encode(h.sum()), ABC_DIGEST);
    }

    #[test]
    fn test_with_capacity_prewarms() {
        let pool = HasherPool::with_capacity(3);
        assert_eq!(pool.idle_count(), 3);
        let _a = pool.acquire();
        let _b = pool.acquire();
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.stats().snapshot().reused, 2);
    }

    #[test]
    fn test_concurrent_sums_agree() {
        let pool = HasherPool::new();
        let expected: Sm3Digest = Sm3::digest(b"shared input").into();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(pool.sum(b"shared input"), expected);
                    }
                });
            }
        });
        assert_eq!(pool.stats().snapshot().in_use(), 0);
    }
}
