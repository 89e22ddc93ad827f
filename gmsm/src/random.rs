//! # Random Sources
//!
//! Key generation and signing are the only places the shim consumes
//! entropy. Both take a caller-supplied source, or fall back to the OS
//! CSPRNG (`OsRng`) when the caller doesn't care.
//!
//! Reads always go through [`fill`], which uses the fallible
//! `try_fill_bytes` path so an exhausted or broken source surfaces as
//! [`GmsmError::RandomSource`] instead of a panic deep inside a primitive.
//! If the source blocks, we block with it; there is no timeout here.

use rand::{CryptoRng, RngCore};

use crate::error::{GmsmError, Result};

/// A cryptographically secure byte stream.
///
/// Blanket-implemented for every `RngCore + CryptoRng`, so `OsRng`,
/// `ChaCha20Rng`, `ThreadRng` and friends all qualify.
pub trait RandomSource: RngCore + CryptoRng {}

impl<T: RngCore + CryptoRng + ?Sized> RandomSource for T {}

/// The source used when the caller doesn't supply one.
pub fn default_source() -> rand::rngs::OsRng {
    rand::rngs::OsRng
}

/// Fill `buf` completely from `rng` or fail with `RandomSource`.
pub(crate) fn fill<R: RandomSource + ?Sized>(rng: &mut R, buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf).map_err(GmsmError::RandomSource)
}


#[cfg(test)]
mod tests {
    use super::test_support::ExhaustibleRng;
    use super::*;

    #[test]
    fn test_fill_from_os_source() {
        let mut buf = [0u8; 40];
        fill(&mut default_source(), &mut buf).unwrap();
        // 40 zero bytes from a working CSPRNG would be a miracle.
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_fill_surfaces_source_failure() {
        let mut rng = ExhaustibleRng::new(7, 1);
        let mut buf = [0u8; 16];
        assert!(fill(&mut rng, &mut buf).is_ok());
        let err = fill(&mut rng, &mut buf).unwrap_err();
        assert!(matches!(err, GmsmError::RandomSource(_)));
    }
}
