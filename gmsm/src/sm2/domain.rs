//! # Curve Domain Parameters
//!
//! The SM2 domain (curve, base point, order) is fixed, so there is exactly
//! one [`DomainParams`] per process. It is built on first use and then only
//! ever handed out by `&'static` reference: every key carries a
//! back-reference to it, nobody owns it, and it is never freed.
//!
//! The only arithmetic this layer does on the domain is the key-generation
//! reduction `k = (wide mod (n - 2)) + 1`. Everything else (point
//! multiplication, inversion) belongs to the `sm2` crate.

use std::fmt;
use std::sync::OnceLock;

use num_bigint::BigUint;

use crate::config::{KEYGEN_EXTRA_BYTES, SM2_BIT_SIZE, SM2_CURVE_NAME, SM2_ORDER};

use super::keys::SecretScalar;

static SM2P256V1: OnceLock<DomainParams> = OnceLock::new();

/// Immutable curve parameters shared by every key on the curve.
pub struct DomainParams {
    name: &'static str,
    bit_size: usize,
    order: BigUint,
    order_minus_two: BigUint,
}

impl DomainParams {
    /// The recommended SM2 curve, initialized on first call.
    pub fn sm2() -> &'static DomainParams {
        SM2P256V1.get_or_init(|| {
            let order = BigUint::from_bytes_be(&SM2_ORDER);
            let order_minus_two = &order - 2u32;
            DomainParams {
                name: SM2_CURVE_NAME,
                bit_size: SM2_BIT_SIZE,
                order,
                order_minus_two,
            }
        })
    }

    /// Curve name, e.g. `sm2p256v1`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bit size of the group order.
    pub fn bit_size(&self) -> usize {
        self.bit_size
    }

    /// Group order `n`.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Number of random bytes key generation draws: the curve size plus 64
    /// bits of slack so the reduction below is close to uniform.
    pub fn keygen_len(&self) -> usize {
        self.bit_size / 8 + KEYGEN_EXTRA_BYTES
    }

    /// Map a wide random buffer onto a private scalar: `(wide mod (n-2)) + 1`.
    ///
    /// The result always lies in `[1, n-2]`, which is inside the valid
    /// private-key range `[1, n-1]`. Zero is impossible by construction.
    pub fn reduce_wide(&self, wide: &[u8]) -> SecretScalar {
        let k = BigUint::from_bytes_be(wide) % &self.order_minus_two + 1u32;
        SecretScalar::from_be_slice(&k.to_bytes_be())
    }

    /// Whether `scalar` is an acceptable private key, i.e. in `[1, n-1]`.
    pub fn contains_scalar(&self, scalar: &SecretScalar) -> bool {
        let k = BigUint::from_bytes_be(scalar.as_bytes());
        k > BigUint::from(0u32) && k < self.order
    }
}

impl fmt::Debug for DomainParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainParams")
            .field("name", &self.name)
            .field("bit_size", &self.bit_size)
            .finish()
    }
}

impl PartialEq for DomainParams {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.order == other.order
    }
}

impl Eq for DomainParams {}
