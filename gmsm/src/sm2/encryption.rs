//! # SM2 Public-Key Encryption
//!
//! GM/T 0003.4 encryption over the curve arithmetic of the `sm2` crate.
//! Ciphertexts are laid out as `C1 || C3 || C2`:
//!
//! ```text
//! C1  65 bytes   uncompressed ephemeral point k·G
//! C3  32 bytes   SM3(x2 || M || y2)
//! C2  |M| bytes  M xor KDF(x2 || y2, |M|)
//! ```
//!
//! where `(x2, y2)` is `k·P` when encrypting and `d·C1` when decrypting. The
//! KDF is the SM3 counter construction from the same standard.
//!
//! The ephemeral scalar is drawn from the caller's [`RandomSource`] and
//! reduced exactly like a private key, so a seeded source gives a
//! reproducible ciphertext. If the KDF output is all zero the draw is
//! discarded and repeated.

use ::sm3::digest::Digest;
use ::sm3::Sm3;
use sm2::elliptic_curve::group::Curve;
use sm2::elliptic_curve::sec1::ToEncodedPoint;
use sm2::elliptic_curve::subtle::ConstantTimeEq;
use sm2::{ProjectivePoint, PublicKey, SecretKey};
use zeroize::{Zeroize, Zeroizing};

use crate::config::{COORDINATE_LENGTH, SM3_DIGEST_LENGTH, UNCOMPRESSED_POINT_LENGTH};
use crate::error::{GmsmError, Result};
use crate::random::{self, RandomSource};

use super::domain::DomainParams;

/// Bytes of `C1 || C3`; anything shorter cannot be a ciphertext.
pub const CIPHERTEXT_OVERHEAD: usize = UNCOMPRESSED_POINT_LENGTH + SM3_DIGEST_LENGTH;

type SharedPoint = Zeroizing<[u8; 2 * COORDINATE_LENGTH]>;

/// Encrypt `message` to `public`, drawing the ephemeral scalar from `rng`.
pub(crate) fn encrypt<R: RandomSource + ?Sized>(
    rng: &mut R,
    domain: &DomainParams,
    public: &PublicKey,
    message: &[u8],
) -> Result<Vec<u8>> {
    let target = public.to_projective();

    loop {
        let mut wide = Zeroizing::new(vec![0u8; domain.keygen_len()]);
        random::fill(rng, &mut wide)?;
        let ephemeral = SecretKey::from_slice(domain.reduce_wide(&wide).as_bytes())?;

        let shared = shared_point(&target, &ephemeral)?;
        let mask = kdf(&shared[..], message.len());
        if is_degenerate(&mask) {
            continue;
        }

        let c1 = ephemeral.public_key().to_encoded_point(false);
        let mut out = Vec::with_capacity(CIPHERTEXT_OVERHEAD + message.len());
        out.extend_from_slice(c1.as_bytes());
        out.extend_from_slice(&checksum(&shared, message));
        out.extend(message.iter().zip(mask.iter()).map(|(m, t)| m ^ t));
        return Ok(out);
    }
}

/// Decrypt a `C1 || C3 || C2` ciphertext with `secret`.
///
/// A bad `C1` point, a degenerate KDF output or a `C3` mismatch all come
/// back as the same curve error; the plaintext is wiped before returning.
pub(crate) fn decrypt(secret: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < CIPHERTEXT_OVERHEAD {
        return Err(GmsmError::CiphertextTooShort {
            min: CIPHERTEXT_OVERHEAD,
            got: ciphertext.len(),
        });
    }
    let (c1, rest) = ciphertext.split_at(UNCOMPRESSED_POINT_LENGTH);
    let (c3, c2) = rest.split_at(SM3_DIGEST_LENGTH);

    let c1 = PublicKey::from_sec1_bytes(c1)?;
    let shared = shared_point(&c1.to_projective(), secret)?;
    let mask = kdf(&shared[..], c2.len());
    if is_degenerate(&mask) {
        return Err(rejected());
    }

    let mut message: Vec<u8> = c2.iter().zip(mask.iter()).map(|(c, t)| c ^ t).collect();
    if !bool::from(checksum(&shared, &message)[..].ct_eq(c3)) {
        message.zeroize();
        return Err(rejected());
    }
    Ok(message)
}

fn rejected() -> GmsmError {
    GmsmError::Curve(sm2::elliptic_curve::Error)
}

/// `scalar · point` as `x || y`.
fn shared_point(point: &ProjectivePoint, scalar: &SecretKey) -> Result<SharedPoint> {
    let product = (*point * *scalar.to_nonzero_scalar()).to_affine();
    let encoded = PublicKey::from_affine(product)?.to_encoded_point(false);
    let mut xy: SharedPoint = Zeroizing::new([0u8; 2 * COORDINATE_LENGTH]);
    xy.copy_from_slice(&encoded.as_bytes()[1..]);
    Ok(xy)
}

/// `C3 = SM3(x2 || M || y2)`.
fn checksum(shared: &SharedPoint, message: &[u8]) -> [u8; SM3_DIGEST_LENGTH] {
    Sm3::new()
        .chain_update(&shared[..COORDINATE_LENGTH])
        .chain_update(message)
        .chain_update(&shared[COORDINATE_LENGTH..])
        .finalize()
        .into()
}

/// SM3 counter-mode KDF: `H(z || 1) || H(z || 2) || ...` truncated to `len`.
fn kdf(z: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::with_capacity(len));
    let mut counter: u32 = 1;
    while out.len() < len {
        let block = Sm3::new()
            .chain_update(z)
            .chain_update(counter.to_be_bytes())
            .finalize();
        let take = (len - out.len()).min(block.len());
        out.extend_from_slice(&block[..take]);
        counter = counter.wrapping_add(1);
    }
    out
}

/// An all-zero mask would leave the message in the clear. An empty mask
/// (empty message) is fine.
fn is_degenerate(mask: &[u8]) -> bool {
    !mask.is_empty() && mask.iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::test_support::ExhaustibleRng;
    use crate::sm2::keys::Sm2PrivateKey;

    fn keys() -> (SecretKey, PublicKey) {
        let key = Sm2PrivateKey::generate().unwrap();
        let secret = SecretKey::from_slice(key.scalar().as_bytes()).unwrap();
        let public = secret.public_key();
        (secret, public)
    }

    #[test]
    fn test_layout_is_c1_c3_c2() {
        let (secret, public) = keys();
        let msg = b"layout check";
        let ct = encrypt(&mut random::default_source(), DomainParams::sm2(), &public, msg).unwrap();

        assert_eq!(ct.len(), CIPHERTEXT_OVERHEAD + msg.len());
        assert_eq!(ct[0], 0x04, "C1 is an uncompressed point");
        assert!(PublicKey::from_sec1_bytes(&ct[..UNCOMPRESSED_POINT_LENGTH]).is_ok());
        assert_eq!(decrypt(&secret, &ct).unwrap(), msg);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let (_, public) = keys();
        let domain = DomainParams::sm2();
        let a = encrypt(&mut ExhaustibleRng::new(5, 4), domain, &public, b"msg").unwrap();
        let b = encrypt(&mut ExhaustibleRng::new(5, 4), domain, &public, b"msg").unwrap();
        let c = encrypt(&mut ExhaustibleRng::new(6, 4), domain, &public, b"msg").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_failure_surfaces() {
        let (_, public) = keys();
        let err = encrypt(&mut ExhaustibleRng::new(1, 0), DomainParams::sm2(), &public, b"msg")
            .unwrap_err();
        assert!(matches!(err, GmsmError::RandomSource(_)));
    }

    #[test]
    fn test_empty_message_roundtrip() {
        let (secret, public) = keys();
        let ct = encrypt(&mut random::default_source(), DomainParams::sm2(), &public, b"").unwrap();
        assert_eq!(ct.len(), CIPHERTEXT_OVERHEAD);
        assert!(decrypt(&secret, &ct).unwrap().is_empty());
    }

    #[test]
    fn test_tampering_is_detected() {
        let (secret, public) = keys();
        let ct = encrypt(&mut random::default_source(), DomainParams::sm2(), &public, b"attack at dawn")
            .unwrap();

        // Flip a bit in C3, then in C2.
        for index in [UNCOMPRESSED_POINT_LENGTH + 3, CIPHERTEXT_OVERHEAD + 1] {
            let mut bad = ct.clone();
            bad[index] ^= 0x01;
            assert!(matches!(decrypt(&secret, &bad), Err(GmsmError::Curve(_))));
        }

        // C1 knocked off the curve.
        let mut bad = ct.clone();
        bad[10] ^= 0x01;
        assert!(decrypt(&secret, &bad).is_err());
    }

    #[test]
    fn test_short_ciphertext_rejected() {
        let (secret, _) = keys();
        assert!(matches!(
            decrypt(&secret, &[0x04; 96]),
            Err(GmsmError::CiphertextTooShort { min: 97, got: 96 })
        ));
    }

    #[test]
    fn test_kdf_blocks_chain_by_counter() {
        let z = [0x11u8; 64];
        let long = kdf(&z, 40);
        assert_eq!(long.len(), 40);
        assert_eq!(&long[..7], &kdf(&z, 7)[..]);

        let first: [u8; 32] = Sm3::new()
            .chain_update(z)
            .chain_update(1u32.to_be_bytes())
            .finalize()
            .into();
        assert_eq!(&long[..32], &first[..]);
        assert!(kdf(&z, 0).is_empty());
    }
}
