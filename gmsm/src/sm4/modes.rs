//! # SM4 Block-Cipher Modes
//!
//! The four supported modes as plain functions over a 16-byte key, plus the
//! [`CipherMode`] selector.
//!
//! | Mode | Padding | IV  | Ciphertext length          |
//! |------|---------|-----|----------------------------|
//! | ECB  | PKCS#7  | no  | next multiple of 16        |
//! | CBC  | PKCS#7  | yes | next multiple of 16        |
//! | CFB  | none    | yes | same as plaintext          |
//! | OFB  | none    | yes | same as plaintext          |
//!
//! Each mode owns its IV. The CBC, CFB and OFB encrypt functions draw a
//! fresh 16-byte IV from the caller's source and return `iv || ciphertext`;
//! their decrypt functions split that prefix back off. ECB takes no IV and
//! returns the bare ciphertext.
//!
//! ECB leaks equal plaintext blocks as equal ciphertext blocks. It is here
//! because it is fast and some callers need it, not because it is a good
//! default.

use std::fmt;
use std::str::FromStr;

use ::sm4::Sm4;
use cipher::block_padding::Pkcs7;
use cipher::{AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, StreamCipher};
use serde::Serialize;

use crate::config::{SM4_BLOCK_SIZE, SM4_IV_LENGTH, SM4_KEY_LENGTH};
use crate::error::{GmsmError, Result};
use crate::random::{self, RandomSource};

/// A 16-byte SM4 key.
pub type Sm4Key = [u8; SM4_KEY_LENGTH];

/// A 16-byte initialization vector.
pub type Iv = [u8; SM4_IV_LENGTH];

/// Supported SM4 modes of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CipherMode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
}

impl CipherMode {
    /// Every mode, in selector order.
    pub const ALL: [CipherMode; 4] = [Self::Ecb, Self::Cbc, Self::Cfb, Self::Ofb];

    /// Upper-case mode name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ecb => "ECB",
            Self::Cbc => "CBC",
            Self::Cfb => "CFB",
            Self::Ofb => "OFB",
        }
    }

    /// Whether the ciphertext carries an IV prefix.
    pub fn uses_iv(self) -> bool {
        !matches!(self, Self::Ecb)
    }

    /// Whether the plaintext is PKCS#7 padded to a block boundary.
    pub fn is_padded(self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherMode {
    type Err = GmsmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GmsmError::UnsupportedMode(s.to_string()))
    }
}

impl TryFrom<u8> for CipherMode {
    type Error = GmsmError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| GmsmError::UnsupportedMode(value.to_string()))
    }
}

impl From<CipherMode> for u8 {
    fn from(mode: CipherMode) -> u8 {
        match mode {
            CipherMode::Ecb => 0,
            CipherMode::Cbc => 1,
            CipherMode::Cfb => 2,
            CipherMode::Ofb => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// ECB
// ---------------------------------------------------------------------------

pub fn ecb_encrypt(key: &Sm4Key, plaintext: &[u8]) -> Vec<u8> {
    ecb::Encryptor::<Sm4>::new(key.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

pub fn ecb_decrypt(key: &Sm4Key, ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_padded_len(ciphertext)?;
    ecb::Decryptor::<Sm4>::new(key.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| GmsmError::Padding)
}

// ---------------------------------------------------------------------------
// CBC
// ---------------------------------------------------------------------------

/// `iv || CBC(pkcs7(plaintext))` under a fresh IV from `rng`.
pub fn cbc_encrypt<R: RandomSource + ?Sized>(
    rng: &mut R,
    key: &Sm4Key,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let iv = fresh_iv(rng)?;
    Ok(framed(&iv, cbc_encrypt_raw(key, &iv, plaintext)))
}

pub fn cbc_decrypt(key: &Sm4Key, data: &[u8]) -> Result<Vec<u8>> {
    let (iv, body) = split_iv(data)?;
    cbc_decrypt_raw(key, iv, body)
}

fn cbc_encrypt_raw(key: &Sm4Key, iv: &Iv, plaintext: &[u8]) -> Vec<u8> {
    cbc::Encryptor::<Sm4>::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

fn cbc_decrypt_raw(key: &Sm4Key, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_padded_len(ciphertext)?;
    cbc::Decryptor::<Sm4>::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| GmsmError::Padding)
}

// ---------------------------------------------------------------------------
// CFB (full-block feedback)
// ---------------------------------------------------------------------------

/// `iv || CFB(plaintext)` under a fresh IV from `rng`.
pub fn cfb_encrypt<R: RandomSource + ?Sized>(
    rng: &mut R,
    key: &Sm4Key,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let iv = fresh_iv(rng)?;
    let mut buf = plaintext.to_vec();
    cfb_mode::Encryptor::<Sm4>::new(key.into(), (&iv).into()).encrypt(&mut buf);
    Ok(framed(&iv, buf))
}

pub fn cfb_decrypt(key: &Sm4Key, data: &[u8]) -> Result<Vec<u8>> {
    let (iv, body) = split_iv(data)?;
    let mut buf = body.to_vec();
    cfb_mode::Decryptor::<Sm4>::new(key.into(), iv.into()).decrypt(&mut buf);
    Ok(buf)
}

// ---------------------------------------------------------------------------
// OFB
// ---------------------------------------------------------------------------

/// `iv || OFB(plaintext)` under a fresh IV from `rng`.
pub fn ofb_encrypt<R: RandomSource + ?Sized>(
    rng: &mut R,
    key: &Sm4Key,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let iv = fresh_iv(rng)?;
    Ok(framed(&iv, ofb_keystream(key, &iv, plaintext)))
}

pub fn ofb_decrypt(key: &Sm4Key, data: &[u8]) -> Result<Vec<u8>> {
    let (iv, body) = split_iv(data)?;
    Ok(ofb_keystream(key, iv, body))
}

/// OFB is its own inverse.
fn ofb_keystream(key: &Sm4Key, iv: &Iv, input: &[u8]) -> Vec<u8> {
    let mut buf = input.to_vec();
    ofb::Ofb::<Sm4>::new(key.into(), iv.into()).apply_keystream(&mut buf);
    buf
}

// ---------------------------------------------------------------------------
// IV framing
// ---------------------------------------------------------------------------

fn fresh_iv<R: RandomSource + ?Sized>(rng: &mut R) -> Result<Iv> {
    let mut iv: Iv = [0u8; SM4_IV_LENGTH];
    random::fill(rng, &mut iv)?;
    Ok(iv)
}

fn framed(iv: &Iv, body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(SM4_IV_LENGTH + body.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&body);
    out
}

fn split_iv(data: &[u8]) -> Result<(&Iv, &[u8])> {
    let too_short = || GmsmError::CiphertextTooShort {
        min: SM4_IV_LENGTH,
        got: data.len(),
    };
    if data.len() < SM4_IV_LENGTH {
        return Err(too_short());
    }
    let (iv, body) = data.split_at(SM4_IV_LENGTH);
    let iv = iv.try_into().map_err(|_| too_short())?;
    Ok((iv, body))
}

/// PKCS#7 output is at least one block and always whole blocks.
fn check_padded_len(ciphertext: &[u8]) -> Result<()> {
    if ciphertext.len() < SM4_BLOCK_SIZE {
        return Err(GmsmError::CiphertextTooShort {
            min: SM4_BLOCK_SIZE,
            got: ciphertext.len(),
        });
    }
    if ciphertext.len() % SM4_BLOCK_SIZE != 0 {
        return Err(GmsmError::Padding);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::test_support::ExhaustibleRng;

    // GM/T 0002-2012, Appendix A, example 1.
    const KAT_KEY: &str = "0123456789abcdeffedcba9876543210";
    const KAT_CIPHERTEXT: &str = "681edf34d206965e86b3e94f536e4246";

    fn kat_key() -> Sm4Key {
        let mut key = [0u8; SM4_KEY_LENGTH];
        key.copy_from_slice(&hex::decode(KAT_KEY).unwrap());
        key
    }

    #[test]
    fn test_ecb_known_answer() {
        let key = kat_key();
        // Plaintext equals the key in the published example.
        let ct = ecb_encrypt(&key, &key);
        assert_eq!(ct.len(), 32, "one data block plus one full padding block");
        assert_eq!(hex::encode(&ct[..16]), KAT_CIPHERTEXT);
        assert_eq!(ecb_decrypt(&key, &ct).unwrap(), key);
    }

    #[test]
    fn test_ecb_equal_blocks_leak() {
        let key = kat_key();
        let ct = ecb_encrypt(&key, &[0x42; 32]);
        assert_eq!(ct[..16], ct[16..32]);
    }

    #[test]
    fn test_cbc_chains_blocks() {
        let key = kat_key();
        let iv = [7u8; SM4_IV_LENGTH];
        let ct = cbc_encrypt_raw(&key, &iv, &[0x42; 32]);
        assert_ne!(ct[..16], ct[16..32]);
        assert_eq!(cbc_decrypt_raw(&key, &iv, &ct).unwrap(), vec![0x42; 32]);
    }

    #[test]
    fn test_iv_is_prefixed() {
        let key = kat_key();
        let pt = b"seventeen bytes!!";
        let mut rng = ExhaustibleRng::new(3, 3);
        let cbc = cbc_encrypt(&mut rng, &key, pt).unwrap();
        let cfb = cfb_encrypt(&mut rng, &key, pt).unwrap();
        let ofb = ofb_encrypt(&mut rng, &key, pt).unwrap();

        assert_eq!(cbc.len(), SM4_IV_LENGTH + 32);
        assert_eq!(cfb.len(), SM4_IV_LENGTH + pt.len());
        assert_eq!(ofb.len(), SM4_IV_LENGTH + pt.len());

        let iv: Iv = cbc[..SM4_IV_LENGTH].try_into().unwrap();
        assert_eq!(cbc[SM4_IV_LENGTH..], cbc_encrypt_raw(&key, &iv, pt)[..]);
        let iv: Iv = ofb[..SM4_IV_LENGTH].try_into().unwrap();
        assert_eq!(ofb[SM4_IV_LENGTH..], ofb_keystream(&key, &iv, pt)[..]);

        assert_eq!(cbc_decrypt(&key, &cbc).unwrap(), pt);
        assert_eq!(cfb_decrypt(&key, &cfb).unwrap(), pt);
        assert_eq!(ofb_decrypt(&key, &ofb).unwrap(), pt);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = kat_key();
        let mut rng = ExhaustibleRng::new(11, 2);
        let a = cfb_encrypt(&mut rng, &key, b"same").unwrap();
        let b = cfb_encrypt(&mut rng, &key, b"same").unwrap();
        assert_ne!(a[..SM4_IV_LENGTH], b[..SM4_IV_LENGTH]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_iv_failure_surfaces() {
        let key = kat_key();
        for result in [
            cbc_encrypt(&mut ExhaustibleRng::new(0, 0), &key, b"x"),
            cfb_encrypt(&mut ExhaustibleRng::new(0, 0), &key, b"x"),
            ofb_encrypt(&mut ExhaustibleRng::new(0, 0), &key, b"x"),
        ] {
            assert!(matches!(result, Err(GmsmError::RandomSource(_))));
        }
    }

    #[test]
    fn test_short_ciphertext_rejected() {
        let key = kat_key();
        for result in [
            cbc_decrypt(&key, &[0u8; 10]),
            cfb_decrypt(&key, &[0u8; 10]),
            ofb_decrypt(&key, &[0u8; 10]),
        ] {
            assert!(matches!(result, Err(GmsmError::CiphertextTooShort { min: 16, got: 10 })));
        }
        // IV alone is a valid empty stream-mode message.
        assert!(ofb_decrypt(&key, &[0u8; 16]).unwrap().is_empty());
        assert!(cfb_decrypt(&key, &[0u8; 16]).unwrap().is_empty());
        // CBC still needs one padded block after the IV.
        assert!(matches!(
            cbc_decrypt(&key, &[0u8; 16]),
            Err(GmsmError::CiphertextTooShort { min: 16, got: 0 })
        ));
    }

    #[test]
    fn test_padded_modes_reject_ragged_input() {
        let key = kat_key();
        assert!(matches!(ecb_decrypt(&key, &[0u8; 17]), Err(GmsmError::Padding)));
        assert!(matches!(cbc_decrypt(&key, &[0u8; 16 + 20]), Err(GmsmError::Padding)));
    }

    #[test]
    fn test_mode_selectors() {
        assert_eq!(CipherMode::try_from(0u8).unwrap(), CipherMode::Ecb);
        assert_eq!(CipherMode::try_from(3u8).unwrap(), CipherMode::Ofb);
        assert!(matches!(CipherMode::try_from(4u8), Err(GmsmError::UnsupportedMode(_))));

        assert_eq!("cbc".parse::<CipherMode>().unwrap(), CipherMode::Cbc);
        assert_eq!(" Cfb ".parse::<CipherMode>().unwrap(), CipherMode::Cfb);
        assert!(matches!("ctr".parse::<CipherMode>(), Err(GmsmError::UnsupportedMode(_))));

        for mode in CipherMode::ALL {
            assert_eq!(CipherMode::try_from(u8::from(mode)).unwrap(), mode);
            assert_eq!(mode.to_string().parse::<CipherMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_properties() {
        assert!(!CipherMode::Ecb.uses_iv());
        assert!(CipherMode::Cbc.uses_iv() && CipherMode::Cbc.is_padded());
        assert!(!CipherMode::Cfb.is_padded());
        assert!(!CipherMode::Ofb.is_padded());
    }
}
