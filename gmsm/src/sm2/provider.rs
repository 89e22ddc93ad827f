//! # SM2 Primitive Provider
//!
//! The one place this crate talks to the `sm2` crate. Everything above it
//! (pools, batch engine, facade) works with the plain key types from
//! `keys.rs` and calls in here for curve work.
//!
//! ## Signatures
//!
//! Signatures are the raw 64-byte `r || s` form, not DER. The nonce is
//! derived RFC 6979-style from the key and message, hedged with 32 bytes
//! drawn from the caller's random source. We draw those bytes ourselves,
//! up front, through the fallible path, so a dead source shows up as
//! [`GmsmError::RandomSource`] rather than a panic inside the signer.
//!
//! ## Prepared keys
//!
//! Building an `sm2` signing or verifying key computes `Z_A` (an SM3 hash
//! over the curve parameters, the public point and the distinguishing ID).
//! [`Sm2Signer`] and [`Sm2Verifier`] do that once so a batch over one key
//! doesn't pay for it per message.
//!
//! ## Encryption
//!
//! `C1 || C3 || C2` encryption lives in [`encryption`](super::encryption);
//! the provider only converts key types and hands over the caller's source.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sm2::dsa::signature::{RandomizedSigner, Verifier};
use sm2::dsa::{Signature, SigningKey, VerifyingKey};
use sm2::elliptic_curve::sec1::ToEncodedPoint;
use sm2::{PublicKey, SecretKey};
use zeroize::Zeroizing;

use crate::config::{DEFAULT_DISTINGUISHING_ID, NONCE_SEED_LENGTH};
use crate::error::Result;
use crate::random::{self, RandomSource};

use super::domain::DomainParams;
use super::encryption;
use super::keys::{PublicPoint, SecretScalar, Sm2PrivateKey, Sm2PublicKey};

/// Base-point scalar multiplication: `d·G` as affine coordinates.
pub(crate) fn scalar_base_mul(scalar: &SecretScalar) -> Result<PublicPoint> {
    let secret = SecretKey::from_slice(scalar.as_bytes())?;
    let encoded = secret.public_key().to_encoded_point(false);
    PublicPoint::from_uncompressed(encoded.as_bytes())
}

/// Decode a compressed or uncompressed SEC1 point. Off-curve points and the
/// identity are rejected.
pub(crate) fn decode_public_point(bytes: &[u8]) -> Result<PublicPoint> {
    let public = PublicKey::from_sec1_bytes(bytes)?;
    PublicPoint::from_uncompressed(public.to_encoded_point(false).as_bytes())
}

fn to_public_key(point: &PublicPoint) -> Result<PublicKey> {
    Ok(PublicKey::from_sec1_bytes(&point.to_sec1_bytes())?)
}

fn to_secret_key(key: &Sm2PrivateKey) -> Result<SecretKey> {
    Ok(SecretKey::from_slice(key.scalar().as_bytes())?)
}

/// SM2 operations bound to one distinguishing identifier.
#[derive(Debug, Clone)]
pub struct Sm2Provider {
    domain: &'static DomainParams,
    distid: String,
}

impl Default for Sm2Provider {
    fn default() -> Self {
        Self::new(DEFAULT_DISTINGUISHING_ID)
    }
}

impl Sm2Provider {
    /// A provider that signs and verifies under `distid`.
    pub fn new(distid: impl Into<String>) -> Self {
        Self {
            domain: DomainParams::sm2(),
            distid: distid.into(),
        }
    }

    /// Curve parameters.
    pub fn domain(&self) -> &'static DomainParams {
        self.domain
    }

    /// The distinguishing identifier mixed into `Z_A`.
    pub fn distinguishing_id(&self) -> &str {
        &self.distid
    }

    /// Prepare `key` for repeated signing.
    pub fn signer(&self, key: &Sm2PrivateKey) -> Result<Sm2Signer> {
        let secret = to_secret_key(key)?;
        Ok(Sm2Signer {
            inner: SigningKey::new(&self.distid, &secret)?,
        })
    }

    /// Prepare `key` for repeated verification.
    pub fn verifier(&self, key: &Sm2PublicKey) -> Result<Sm2Verifier> {
        let public = to_public_key(key.point())?;
        Ok(Sm2Verifier {
            inner: VerifyingKey::new(&self.distid, public)?,
        })
    }

    /// Sign `message` with `key`, hedging the nonce with bytes from `rng`.
    pub fn sign<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        key: &Sm2PrivateKey,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        self.signer(key)?.sign_with(rng, message)
    }

    /// Verify a raw `r || s` signature. Any malformed input is just `false`.
    pub fn verify(&self, key: &Sm2PublicKey, message: &[u8], signature: &[u8]) -> bool {
        match self.verifier(key) {
            Ok(verifier) => verifier.verify(message, signature),
            Err(_) => false,
        }
    }

    /// SM2 public-key encryption (`C1 || C3 || C2`). The ephemeral scalar
    /// is drawn from `rng`.
    pub fn encrypt<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        key: &Sm2PublicKey,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        let public = to_public_key(key.point())?;
        encryption::encrypt(rng, self.domain, &public, message)
    }

    /// Inverse of [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, key: &Sm2PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let secret = to_secret_key(key)?;
        encryption::decrypt(&secret, ciphertext)
    }
}

/// A signing key with `Z_A` already computed.
pub struct Sm2Signer {
    inner: SigningKey,
}

impl Sm2Signer {
    /// Sign one message. Draws exactly one 32-byte seed from `rng`.
    pub fn sign_with<R: RandomSource + ?Sized>(&self, rng: &mut R, message: &[u8]) -> Result<Vec<u8>> {
        let mut seed = Zeroizing::new([0u8; NONCE_SEED_LENGTH]);
        random::fill(rng, &mut seed[..])?;
        let mut hedge = ChaCha20Rng::from_seed(*seed);
        let signature: Signature = self.inner.try_sign_with_rng(&mut hedge, message)?;
        Ok(signature.to_bytes().to_vec())
    }
}

/// A verifying key with `Z_A` already computed.
pub struct Sm2Verifier {
    inner: VerifyingKey,
}

impl Sm2Verifier {
    /// `true` iff `signature` is a valid `r || s` over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        self.inner.verify(message, &signature).is_ok()
    }
}
