//! # SM2 Key Pool
//!
//! A cache of key containers that hands out freshly generated SM2 key
//! pairs and takes the containers back afterwards.
//!
//! A container is a boxed [`Sm2PrivateKey`] slot. It is either **live**
//! (scalar and both coordinates populated) or **empty** (all three zero).
//! Key material is written into the box in place and wiped in place, so no
//! stale copy of a secret is left behind by a move.
//!
//! ## Lifecycle
//!
//! 1. [`KeyPool::acquire`] pops an empty container, or allocates one if the
//!    free list is dry. The pool never caps its size.
//! 2. The container is filled with a new key pair. If the random source
//!    fails, the container goes straight back to the free list, still empty,
//!    and the caller gets [`GmsmError::RandomSource`].
//! 3. The caller holds a [`PooledKey`] guard. Dropping it (or calling
//!    [`PooledKey::release`]) zeroizes the key and pushes the container back.
//!
//! The free-list lock is held for exactly one `push` or `pop`. Key
//! generation and scrubbing both happen outside it.
//!
//! [`GmsmError::RandomSource`]: crate::GmsmError::RandomSource

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;
use zeroize::Zeroize;

use crate::error::Result;
use crate::random::{self, RandomSource};
use crate::stats::PoolStats;

use super::domain::DomainParams;
use super::keys::Sm2PrivateKey;

/// A reusable slot for one key pair.
struct KeyContainer {
    id: u64,
    key: Box<Sm2PrivateKey>,
}

/// Concurrency-safe pool of SM2 key containers.
pub struct KeyPool {
    domain: &'static DomainParams,
    free: Mutex<Vec<KeyContainer>>,
    next_id: AtomicU64,
    stats: PoolStats,
}

impl Default for KeyPool {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPool {
    /// An empty pool. Containers are allocated on first demand.
    pub fn new() -> Self {
        Self {
            domain: DomainParams::sm2(),
            free: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            stats: PoolStats::default(),
        }
    }

    /// A pool with `n` empty containers allocated up front.
    pub fn with_capacity(n: usize) -> Self {
        let pool = Self::new();
        {
            let containers: Vec<KeyContainer> = (0..n).map(|_| pool.new_container()).collect();
            pool.free.lock().extend(containers);
        }
        if n > 0 {
            debug!(containers = n, "key pool pre-warmed");
        }
        pool
    }

    /// Acquire a container holding a new key pair drawn from the OS CSPRNG.
    pub fn acquire(&self) -> Result<PooledKey<'_>> {
        self.acquire_with(&mut random::default_source())
    }

    /// Acquire a container holding a new key pair drawn from `rng`.
    pub fn acquire_with<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<PooledKey<'_>> {
        let (mut container, reused) = self.take_container();

        if let Err(e) = container.key.regenerate_with(rng) {
            container.key.zeroize();
            self.recycle(container);
            return Err(e);
        }

        self.stats.record_acquired(reused);
        Ok(PooledKey {
            pool: self,
            container: Some(container),
        })
    }

    /// Acquire/release counters.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Containers currently sitting in the free list.
    pub fn idle_count(&self) -> usize {
        self.free.lock().len()
    }

    fn take_container(&self) -> (KeyContainer, bool) {
        let popped = self.free.lock().pop();
        match popped {
            Some(container) => {
                debug_assert!(container.key.is_cleared(), "free list held a live key");
                (container, true)
            }
            None => (self.new_container(), false),
        }
    }

    fn new_container(&self) -> KeyContainer {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.stats.record_created();
        debug!(container = id, "key pool allocated container");
        KeyContainer {
            id,
            key: Box::new(Sm2PrivateKey::vacant(self.domain)),
        }
    }

    /// Only scrubbed containers go back on the free list.
    fn recycle(&self, container: KeyContainer) {
        debug_assert!(container.key.is_cleared(), "recycled a live key");
        self.free.lock().push(container);
    }
}

impl fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPool")
            .field("domain", &self.domain.name())
            .field("idle", &self.idle_count())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// A live key pair on loan from a [`KeyPool`].
///
/// Derefs to [`Sm2PrivateKey`]. The key is zeroized and the container
/// returned when the guard is dropped, on every exit path.
pub struct PooledKey<'a> {
    pool: &'a KeyPool,
    // Only `None` while `Drop` runs.
    container: Option<KeyContainer>,
}

impl PooledKey<'_> {
    /// Identity of the underlying container. Stable across reuse.
    pub fn id(&self) -> u64 {
        self.container().id
    }

    /// Copy the key out of the pool. The copy is not scrubbed on release;
    /// it wipes itself when dropped.
    pub fn to_owned_key(&self) -> Sm2PrivateKey {
        (*self.container().key).clone()
    }

    /// Scrub the key and hand the container back. Same as dropping the guard.
    pub fn release(self) {
        drop(self);
    }

    fn container(&self) -> &KeyContainer {
        match &self.container {
            Some(container) => container,
            None => unreachable!("pooled key used after release"),
        }
    }
}

impl Deref for PooledKey<'_> {
    type Target = Sm2PrivateKey;

    fn deref(&self) -> &Sm2PrivateKey {
        &self.container().key
    }
}

impl Drop for PooledKey<'_> {
    fn drop(&mut self) {
        if let Some(mut container) = self.container.take() {
            container.key.zeroize();
            self.pool.recycle(container);
            self.pool.stats.record_released();
        }
    }
}

impl fmt::Debug for PooledKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledKey")
            .field("id", &self.id())
            .field("public", self.public_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GmsmError;
    use crate::random::test_support::ExhaustibleRng;
    use std::collections::HashSet;
    use std::sync::Barrier;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_pool_is_send_sync() {
        assert_send_sync::<KeyPool>();
    }

    #[test]
    fn test_acquire_yields_live_key() {
        let pool = KeyPool::new();
        let key = pool.acquire().unwrap();
        assert!(!key.is_cleared());
        assert!(pool.domain.contains_scalar(key.scalar()));
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_release_scrubs_container() {
        let pool = KeyPool::new();
        let key = pool.acquire().unwrap();
        let id = key.id();
        key.release();

        let free = pool.free.lock();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, id);
        assert!(free[0].key.is_cleared());
    }

    #[test]
    fn test_reacquired_container_never_exposes_old_material() {
        let pool = KeyPool::new();
        let first = pool.acquire().unwrap();
        let (id, old_scalar) = (first.id(), *first.scalar().as_bytes());
        drop(first);

        let second = pool.acquire().unwrap();
        assert_eq!(second.id(), id);
        assert_ne!(second.scalar().as_bytes(), &old_scalar);

        let snap = pool.stats().snapshot();
        assert_eq!(snap.created, 1);
        assert_eq!(snap.reused, 1);
    }

    #[test]
    fn test_failing_source_returns_empty_container() {
        let pool = KeyPool::new();
        let err = pool.acquire_with(&mut ExhaustibleRng::new(3, 0)).unwrap_err();
        assert!(matches!(err, GmsmError::RandomSource(_)));

        let free = pool.free.lock();
        assert_eq!(free.len(), 1);
        assert!(free[0].key.is_cleared());
        drop(free);

        let snap = pool.stats().snapshot();
        assert_eq!(snap.acquired, 0);
        assert_eq!(snap.in_use(), 0);
    }

    #[test]
    fn test_with_capacity_prewarms() {
        let pool = KeyPool::with_capacity(4);
        assert_eq!(pool.idle_count(), 4);
        let key = pool.acquire().unwrap();
        assert_eq!(pool.idle_count(), 3);
        drop(key);
        let snap = pool.stats().snapshot();
        assert_eq!(snap.created, 4);
        assert_eq!(snap.reused, 1);
        assert_eq!(snap.released, 1);
    }

    #[test]
    fn test_owned_copy_survives_release() {
        let pool = KeyPool::new();
        let guard = pool.acquire().unwrap();
        let owned = guard.to_owned_key();
        let public = guard.public_key().clone();
        drop(guard);
        assert_eq!(owned.public_key(), &public);
        assert!(!owned.is_cleared());
    }

    #[test]
    fn test_seeded_acquire_is_reproducible() {
        let a = KeyPool::new();
        let b = KeyPool::new();
        let ka = a.acquire_with(&mut ExhaustibleRng::new(5, 1)).unwrap();
        let kb = b.acquire_with(&mut ExhaustibleRng::new(5, 1)).unwrap();
        assert_eq!(ka.public_key(), kb.public_key());
    }

    #[test]
    fn test_concurrent_holders_get_distinct_containers() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 25;

        let pool = KeyPool::new();
        let barrier = Barrier::new(THREADS);

        let ids: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        let held: Vec<_> = (0..PER_THREAD).map(|_| pool.acquire().unwrap()).collect();
                        let ids: Vec<u64> = held.iter().map(|k| k.id()).collect();
                        // Everyone holds everything before anyone releases.
                        barrier.wait();
                        ids
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), THREADS * PER_THREAD);
        assert_eq!(pool.idle_count(), THREADS * PER_THREAD);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "recycled a live key")]
    fn test_live_key_never_reaches_free_list() {
        let pool = KeyPool::new();
        let mut container = pool.new_container();
        container.key.regenerate_with(&mut ExhaustibleRng::new(2, 1)).unwrap();
        pool.recycle(container);
    }
}
