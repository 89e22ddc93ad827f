//! # Configuration & Constants
//!
//! Every magic number the shim depends on lives here: curve domain sizes,
//! digest and block lengths, the default distinguishing identifier, and the
//! tunables for the object pools.
//!
//! The algorithm constants are fixed by the GM/T standards (GM/T 0003 for SM2,
//! GM/T 0004 for SM3, GM/T 0002 for SM4). They are not knobs. The only values
//! meant to be tuned live in [`GmsmConfig`].

// ---------------------------------------------------------------------------
// SM2 Domain Parameters
// ---------------------------------------------------------------------------

/// Name of the recommended SM2 curve (GM/T 0003.5).
pub const SM2_CURVE_NAME: &str = "sm2p256v1";

/// Order `n` of the SM2 base point, big-endian.
pub const SM2_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x72, 0x03, 0xDF, 0x6B, 0x21, 0xC6, 0x05, 0x2B, 0x53, 0xBB, 0xF4, 0x09, 0x39, 0xD5, 0x41, 0x23,
];

/// Bit size of the SM2 prime field and of the group order.
pub const SM2_BIT_SIZE: usize = 256;

/// Extra random bytes drawn on top of `SM2_BIT_SIZE / 8` during key
/// generation. The 64 surplus bits make the bias of the modular reduction
/// negligible (< 2^-64).
pub const KEYGEN_EXTRA_BYTES: usize = 8;

/// Length of a private scalar in bytes.
pub const SCALAR_LENGTH: usize = SM2_BIT_SIZE / 8;

/// Length of one public-point coordinate in bytes.
pub const COORDINATE_LENGTH: usize = SM2_BIT_SIZE / 8;

/// Length of an uncompressed SEC1 point: `0x04 || x || y`.
pub const UNCOMPRESSED_POINT_LENGTH: usize = 1 + 2 * COORDINATE_LENGTH;

/// Raw `r || s` signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// Seed length used to key the per-signature nonce generator.
pub const NONCE_SEED_LENGTH: usize = 32;

/// Distinguishing identifier used in the SM2 `Z_A` computation when the
/// caller doesn't supply one. This is the default mandated by GM/T 0009.
pub const DEFAULT_DISTINGUISHING_ID: &str = "1234567812345678";

// ---------------------------------------------------------------------------
// SM3
// ---------------------------------------------------------------------------

/// SM3 digest length in bytes.
pub const SM3_DIGEST_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// SM4
// ---------------------------------------------------------------------------

/// SM4 block size in bytes.
pub const SM4_BLOCK_SIZE: usize = 16;

/// SM4 key length in bytes. Same as the block size; the dispatcher checks
/// this before touching the cipher.
pub const SM4_KEY_LENGTH: usize = 16;

/// IV length for the chained modes (CBC, CFB, OFB).
pub const SM4_IV_LENGTH: usize = SM4_BLOCK_SIZE;

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for a [`Gmsm`](crate::Gmsm) context.
///
/// Defaults are what you want unless you know the shape of your workload.
/// Pre-warming only moves allocation to construction time; it never caps
/// the pools, which grow on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmsmConfig {
    /// Distinguishing identifier mixed into every SM2 signature.
    pub distinguishing_id: String,

    /// Number of empty key containers to allocate up front.
    pub key_pool_prewarm: usize,

    /// Number of SM3 states to allocate up front.
    pub hasher_pool_prewarm: usize,
}

impl Default for GmsmConfig {
    fn default() -> Self {
        Self {
            distinguishing_id: DEFAULT_DISTINGUISHING_ID.to_string(),
            key_pool_prewarm: 0,
            hasher_pool_prewarm: 0,
        }
    }
}

impl GmsmConfig {
    /// Override the distinguishing identifier.
    pub fn with_distinguishing_id(mut self, id: impl Into<String>) -> Self {
        self.distinguishing_id = id.into();
        self
    }

    /// Pre-allocate `n` key containers.
    pub fn with_key_pool_prewarm(mut self, n: usize) -> Self {
        self.key_pool_prewarm = n;
        self
    }

    /// Pre-allocate `n` hash states.
    pub fn with_hasher_pool_prewarm(mut self, n: usize) -> Self {
        self.hasher_pool_prewarm = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sm2_sizes_consistent() {
        assert_eq!(SCALAR_LENGTH, 32);
        assert_eq!(COORDINATE_LENGTH, 32);
        assert_eq!(UNCOMPRESSED_POINT_LENGTH, 65);
        assert_eq!(SIGNATURE_LENGTH, 2 * SCALAR_LENGTH);
        assert_eq!(SCALAR_LENGTH + KEYGEN_EXTRA_BYTES, 40);
    }

    #[test]
    fn test_order_matches_published_value() {
        // GM/T 0003.5, recommended curve parameters.
        assert_eq!(
            hex::encode_upper(SM2_ORDER),
            "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123"
        );
        assert_eq!(SM2_ORDER.len() * 8, SM2_BIT_SIZE);
    }

    #[test]
    fn test_sm4_sizes() {
        assert_eq!(SM4_KEY_LENGTH, SM4_BLOCK_SIZE);
        assert_eq!(SM4_IV_LENGTH, 16);
    }

    #[test]
    fn test_default_config() {
        let cfg = GmsmConfig::default();
        assert_eq!(cfg.distinguishing_id, DEFAULT_DISTINGUISHING_ID);
        assert_eq!(cfg.key_pool_prewarm, 0);
        assert_eq!(cfg.hasher_pool_prewarm, 0);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = GmsmConfig::default()
            .with_distinguishing_id("alice@example.com")
            .with_key_pool_prewarm(8)
            .with_hasher_pool_prewarm(4);
        assert_eq!(cfg.distinguishing_id, "alice@example.com");
        assert_eq!(cfg.key_pool_prewarm, 8);
        assert_eq!(cfg.hasher_pool_prewarm, 4);
    }
}
