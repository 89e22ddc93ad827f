//! # SM2 Key Types
//!
//! Plain-data key types that sit between the pools and the `sm2` crate.
//!
//! - [`SecretScalar`]: the 32-byte private scalar. Zeroized on drop, never
//!   printed.
//! - [`PublicPoint`]: the two fixed-width affine coordinates of `d·G`.
//! - [`Sm2PublicKey`] / [`Sm2PrivateKey`]: the halves of a key pair, each
//!   carrying a `&'static` back-reference to the curve [`DomainParams`].
//!
//! Keys are stored as raw bytes rather than as `sm2::SecretKey` so that a
//! pooled container can be filled and scrubbed in place. The `sm2` types are
//! rebuilt on demand at the primitive boundary (see `provider.rs`).
//!
//! Key bytes are never logged. `Debug` output shows the public half only.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{COORDINATE_LENGTH, SCALAR_LENGTH, UNCOMPRESSED_POINT_LENGTH};
use crate::error::{GmsmError, Result};
use crate::random::{self, RandomSource};

use super::domain::DomainParams;
use super::provider;

/// SEC1 tag for an uncompressed point.
const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

// ---------------------------------------------------------------------------
// SecretScalar
// ---------------------------------------------------------------------------

/// A private scalar, big-endian, left-padded to 32 bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretScalar([u8; SCALAR_LENGTH]);

impl SecretScalar {
    /// Build from big-endian bytes. Shorter input is left-padded with zeros;
    /// longer input keeps its low-order 32 bytes.
    pub(crate) fn from_be_slice(bytes: &[u8]) -> Self {
        let mut out = [0u8; SCALAR_LENGTH];
        let src = &bytes[bytes.len().saturating_sub(SCALAR_LENGTH)..];
        out[SCALAR_LENGTH - src.len()..].copy_from_slice(src);
        Self(out)
    }

    pub(crate) fn zeroed() -> Self {
        Self([0u8; SCALAR_LENGTH])
    }

    /// Raw big-endian bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SCALAR_LENGTH] {
        &self.0
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(..)")
    }
}

// ---------------------------------------------------------------------------
// PublicPoint
// ---------------------------------------------------------------------------

/// Affine coordinates of a public point, each a 32-byte big-endian integer.
#[derive(Clone, Copy, PartialEq, Eq, Default, Zeroize)]
pub struct PublicPoint {
    x: [u8; COORDINATE_LENGTH],
    y: [u8; COORDINATE_LENGTH],
}

impl PublicPoint {
    /// The x coordinate.
    pub fn x(&self) -> &[u8; COORDINATE_LENGTH] {
        &self.x
    }

    /// The y coordinate.
    pub fn y(&self) -> &[u8; COORDINATE_LENGTH] {
        &self.y
    }

    /// Uncompressed SEC1 encoding: `0x04 || x || y`.
    pub fn to_sec1_bytes(&self) -> [u8; UNCOMPRESSED_POINT_LENGTH] {
        let mut out = [0u8; UNCOMPRESSED_POINT_LENGTH];
        out[0] = SEC1_UNCOMPRESSED_TAG;
        out[1..1 + COORDINATE_LENGTH].copy_from_slice(&self.x);
        out[1 + COORDINATE_LENGTH..].copy_from_slice(&self.y);
        out
    }

    /// Split an uncompressed SEC1 encoding into coordinates. Only checks the
    /// framing; curve membership is the caller's job.
    pub(crate) fn from_uncompressed(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != UNCOMPRESSED_POINT_LENGTH || bytes[0] != SEC1_UNCOMPRESSED_TAG {
            return Err(GmsmError::InvalidKey("expected an uncompressed SEC1 point"));
        }
        let mut point = Self::default();
        point.x.copy_from_slice(&bytes[1..1 + COORDINATE_LENGTH]);
        point.y.copy_from_slice(&bytes[1 + COORDINATE_LENGTH..]);
        Ok(point)
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.x.iter().chain(self.y.iter()).all(|&b| b == 0)
    }
}

impl fmt::Debug for PublicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicPoint")
            .field("x", &hex::encode(self.x))
            .field("y", &hex::encode(self.y))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Sm2PublicKey
// ---------------------------------------------------------------------------

/// The public half of an SM2 key pair. Safe to share.
#[derive(Clone)]
pub struct Sm2PublicKey {
    point: PublicPoint,
    domain: &'static DomainParams,
}

impl Sm2PublicKey {
    pub(crate) fn new(point: PublicPoint, domain: &'static DomainParams) -> Self {
        Self { point, domain }
    }

    /// Parse a SEC1 point, compressed (33 bytes) or uncompressed (65 bytes),
    /// and check that it lies on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let point = provider::decode_public_point(bytes)?;
        Ok(Self::new(point, DomainParams::sm2()))
    }

    /// Parse a hex-encoded SEC1 point.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes =
            hex::decode(hex_str).map_err(|_| GmsmError::InvalidKey("public key is not hex"))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// The public point.
    pub fn point(&self) -> &PublicPoint {
        &self.point
    }

    /// The curve this key lives on.
    pub fn domain(&self) -> &'static DomainParams {
        self.domain
    }

    /// Uncompressed SEC1 encoding.
    pub fn to_sec1_bytes(&self) -> [u8; UNCOMPRESSED_POINT_LENGTH] {
        self.point.to_sec1_bytes()
    }

    /// Hex of the uncompressed SEC1 encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_sec1_bytes())
    }
}

impl PartialEq for Sm2PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.domain == other.domain
    }
}

impl Eq for Sm2PublicKey {}

impl fmt::Debug for Sm2PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sm2PublicKey({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Sm2PrivateKey
// ---------------------------------------------------------------------------

/// The private half of an SM2 key pair, bundled with its public point.
///
/// The scalar is zeroized when the key is dropped. Cloning is allowed, but
/// every clone is one more copy of the secret to keep track of.
#[derive(Clone)]
pub struct Sm2PrivateKey {
    scalar: SecretScalar,
    public: Sm2PublicKey,
}

impl Sm2PrivateKey {
    /// Generate a fresh key from the OS CSPRNG, bypassing any pool.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut random::default_source())
    }

    /// Generate a fresh key from `rng`, bypassing any pool.
    ///
    /// Same derivation as the pooled path: draw `n_bits/8 + 8` bytes,
    /// reduce into `[1, n-1]`, multiply the base point.
    pub fn generate_with<R: RandomSource + ?Sized>(rng: &mut R) -> Result<Self> {
        let mut key = Self::vacant(DomainParams::sm2());
        key.regenerate_with(rng)?;
        Ok(key)
    }

    /// Replace the key material in place with a freshly generated pair.
    /// On failure `self` is left untouched.
    pub(crate) fn regenerate_with<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let domain = self.public.domain;
        let mut wide = Zeroizing::new(vec![0u8; domain.keygen_len()]);
        random::fill(rng, &mut wide)?;
        let scalar = domain.reduce_wide(&wide);
        let point = provider::scalar_base_mul(&scalar)?;
        self.fill(&scalar, point);
        Ok(())
    }

    /// Rebuild a key from its 32-byte big-endian scalar. The public point is
    /// re-derived, never trusted from outside.
    pub fn from_scalar_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SCALAR_LENGTH {
            return Err(GmsmError::InvalidKey("private scalar must be 32 bytes"));
        }
        let domain = DomainParams::sm2();
        let scalar = SecretScalar::from_be_slice(bytes);
        if !domain.contains_scalar(&scalar) {
            return Err(GmsmError::InvalidKey("private scalar out of range"));
        }
        let point = provider::scalar_base_mul(&scalar)?;
        Ok(Self {
            scalar,
            public: Sm2PublicKey::new(point, domain),
        })
    }

    /// Rebuild a key from a hex-encoded scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|_| GmsmError::InvalidKey("private key is not hex"))?,
        );
        Self::from_scalar_bytes(&bytes)
    }

    /// Hex of the private scalar. The returned string wipes itself on drop.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.scalar.as_bytes()))
    }

    /// The private scalar.
    pub fn scalar(&self) -> &SecretScalar {
        &self.scalar
    }

    /// The matching public key.
    pub fn public_key(&self) -> &Sm2PublicKey {
        &self.public
    }

    /// An empty shell: zero scalar, zero point. Only pools hold these.
    pub(crate) fn vacant(domain: &'static DomainParams) -> Self {
        Self {
            scalar: SecretScalar::zeroed(),
            public: Sm2PublicKey::new(PublicPoint::default(), domain),
        }
    }

    /// Overwrite scalar and point in place.
    pub(crate) fn fill(&mut self, scalar: &SecretScalar, point: PublicPoint) {
        self.scalar.0.copy_from_slice(scalar.as_bytes());
        self.public.point = point;
    }

    /// True when both the scalar and the point have been wiped.
    pub(crate) fn is_cleared(&self) -> bool {
        self.scalar.is_zero() && self.public.point.is_cleared()
    }
}

impl Zeroize for Sm2PrivateKey {
    fn zeroize(&mut self) {
        self.scalar.zeroize();
        self.public.point.zeroize();
    }
}

impl fmt::Debug for Sm2PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public half only. A partial leak is still a leak.
        write!(f, "Sm2PrivateKey(pub={})", self.public.to_hex())
    }
}
