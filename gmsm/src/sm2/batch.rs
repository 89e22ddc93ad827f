//! # Batch Signing & Verification
//!
//! Sign or verify an ordered list of messages with one key. Output index `i`
//! always belongs to input index `i`; nothing is reordered or deduplicated.
//!
//! The two directions fail differently, on purpose:
//!
//! - [`BatchEngine::sign_all`] is fail-fast. The first error aborts the
//!   batch and every signature produced so far is thrown away.
//! - [`BatchEngine::verify_all`] never fails per item. A bad signature is a
//!   `false` at its index. The only error is a length mismatch between
//!   messages and signatures, detected before any verification runs.
//!
//! Batches run sequentially on the calling thread. To parallelize, shard the
//! input and call from several threads; the engine holds no mutable state.

use tracing::debug;

use crate::error::{GmsmError, Result};
use crate::random::{self, RandomSource};

use super::keys::{Sm2PrivateKey, Sm2PublicKey};
use super::provider::Sm2Provider;

/// Repeated sign/verify over one key.
#[derive(Debug, Clone, Copy)]
pub struct BatchEngine<'a> {
    provider: &'a Sm2Provider,
}

impl<'a> BatchEngine<'a> {
    pub fn new(provider: &'a Sm2Provider) -> Self {
        Self { provider }
    }

    /// Sign every message with `key`, nonces hedged from the OS CSPRNG.
    pub fn sign_all<M: AsRef<[u8]>>(&self, key: &Sm2PrivateKey, messages: &[M]) -> Result<Vec<Vec<u8>>> {
        self.sign_all_with(&mut random::default_source(), key, messages)
    }

    /// Sign every message with `key`, drawing one nonce seed per message
    /// from `rng`. Any failure discards the whole batch.
    pub fn sign_all_with<R, M>(&self, rng: &mut R, key: &Sm2PrivateKey, messages: &[M]) -> Result<Vec<Vec<u8>>>
    where
        R: RandomSource + ?Sized,
        M: AsRef<[u8]>,
    {
        let signer = self.provider.signer(key)?;
        let signatures = messages
            .iter()
            .map(|m| signer.sign_with(rng, m.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        debug!(count = signatures.len(), "batch signed");
        Ok(signatures)
    }

    /// Verify `signatures[i]` over `messages[i]` for every `i`.
    pub fn verify_all<M, S>(&self, key: &Sm2PublicKey, messages: &[M], signatures: &[S]) -> Result<Vec<bool>>
    where
        M: AsRef<[u8]>,
        S: AsRef<[u8]>,
    {
        if messages.len() != signatures.len() {
            return Err(GmsmError::CountMismatch {
                messages: messages.len(),
                signatures: signatures.len(),
            });
        }

        let results = match self.provider.verifier(key) {
            Ok(verifier) => messages
                .iter()
                .zip(signatures)
                .map(|(m, s)| verifier.verify(m.as_ref(), s.as_ref()))
                .collect(),
            Err(_) => vec![false; messages.len()],
        };

        debug!(
            count = messages.len(),
            valid = results.iter().filter(|&&ok| ok).count(),
            "batch verified"
        );
        Ok(results)
    }
}
