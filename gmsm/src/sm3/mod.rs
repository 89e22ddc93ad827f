//! # SM3
//!
//! Pooled SM3 hashing. [`HasherPool::sum`] covers the one-shot case;
//! [`Sm3Writer`] covers streaming input.

pub mod pool;
pub mod writer;

pub use pool::{HasherPool, PooledHasher};
pub use writer::Sm3Writer;

use crate::config::SM3_DIGEST_LENGTH;

/// A 32-byte SM3 digest.
pub type Sm3Digest = [u8; SM3_DIGEST_LENGTH];

#[cfg(test)]
mod tests {
    use super::*;
    use ::sm3::digest::Digest;
    use ::sm3::Sm3;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_pooled_sum_matches_fresh_state(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let pool = HasherPool::new();
            let expected: Sm3Digest = Sm3::digest(&data).into();
            prop_assert_eq!(pool.sum(&data), expected);
            // Second pass runs on the recycled state.
            prop_assert_eq!(pool.sum(&data), expected);
        }

        #[test]
        fn prop_split_point_does_not_matter(
            data in proptest::collection::vec(any::<u8>(), 0..1024),
            split in any::<prop::sample::Index>(),
        ) {
            let pool = HasherPool::new();
            let at = if data.is_empty() { 0 } else { split.index(data.len()) };
            let mut w = pool.writer();
            w.update(&data[..at]).unwrap();
            w.update(&data[at..]).unwrap();
            prop_assert_eq!(w.sum().unwrap(), pool.sum(&data));
        }
    }
}
