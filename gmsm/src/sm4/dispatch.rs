//! Key validation and mode routing for SM4.
//!
//! Wire format produced by [`ModeDispatcher::encrypt`]:
//!
//! ```text
//! ECB:           ciphertext
//! CBC, CFB, OFB: iv (16 bytes) || ciphertext
//! ```
//!
//! The framing belongs to the mode functions in `modes.rs`; the dispatcher
//! only checks the key length, on both directions, and picks the function.

use crate::config::SM4_KEY_LENGTH;
use crate::error::{GmsmError, Result};
use crate::random::{self, RandomSource};

use super::modes::{self, CipherMode, Sm4Key};

/// Stateless router from `(key, data, mode)` to the right mode function.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeDispatcher;

impl ModeDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Encrypt under `mode`. IV modes draw their IV from the OS CSPRNG.
    pub fn encrypt(&self, key: &[u8], plaintext: &[u8], mode: CipherMode) -> Result<Vec<u8>> {
        self.encrypt_with(&mut random::default_source(), key, plaintext, mode)
    }

    /// Encrypt under `mode`, handing `rng` to the IV modes.
    pub fn encrypt_with<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        key: &[u8],
        plaintext: &[u8],
        mode: CipherMode,
    ) -> Result<Vec<u8>> {
        let key = check_key(key)?;

        match mode {
            CipherMode::Ecb => Ok(modes::ecb_encrypt(key, plaintext)),
            CipherMode::Cbc => modes::cbc_encrypt(rng, key, plaintext),
            CipherMode::Cfb => modes::cfb_encrypt(rng, key, plaintext),
            CipherMode::Ofb => modes::ofb_encrypt(rng, key, plaintext),
        }
    }

    /// Decrypt output of [`encrypt`](Self::encrypt) under the same mode.
    pub fn decrypt(&self, key: &[u8], ciphertext: &[u8], mode: CipherMode) -> Result<Vec<u8>> {
        let key = check_key(key)?;

        match mode {
            CipherMode::Ecb => modes::ecb_decrypt(key, ciphertext),
            CipherMode::Cbc => modes::cbc_decrypt(key, ciphertext),
            CipherMode::Cfb => modes::cfb_decrypt(key, ciphertext),
            CipherMode::Ofb => modes::ofb_decrypt(key, ciphertext),
        }
    }
}

fn check_key(key: &[u8]) -> Result<&Sm4Key> {
    key.try_into().map_err(|_| GmsmError::InvalidKeySize {
        expected: SM4_KEY_LENGTH,
        got: key.len(),
    })
}
