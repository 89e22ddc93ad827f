//! # Facade
//!
//! [`Gmsm`] bundles everything a typical caller needs behind one value: the
//! SM2 provider, the key pool, the hasher pool and the SM4 dispatcher.
//! There is no global instance. Build one, share it by reference (it is
//! `Send + Sync`), and drop it when you're done.
//!
//! ```
//! use gmsm::{CipherMode, Gmsm};
//!
//! let gm = Gmsm::new();
//!
//! let (private, public) = gm.generate_key_pair().unwrap();
//! let sig = gm.sign(&private, b"test data").unwrap();
//! assert!(gm.verify(&public, b"test data", &sig));
//!
//! let key = [0x11u8; 16];
//! let ct = gm.cipher_encrypt(&key, b"hello", CipherMode::Cbc).unwrap();
//! assert_eq!(gm.cipher_decrypt(&key, &ct, CipherMode::Cbc).unwrap(), b"hello");
//! ```

use tracing::debug;

use crate::config::GmsmConfig;
use crate::error::Result;
use crate::random;
use crate::sm2::{BatchEngine, KeyPool, PooledKey, Sm2PrivateKey, Sm2Provider, Sm2PublicKey};
use crate::sm3::{HasherPool, Sm3Digest, Sm3Writer};
use crate::sm4::{CipherMode, ModeDispatcher};

/// An SM2/SM3/SM4 context that owns its pools.
#[derive(Debug)]
pub struct Gmsm {
    config: GmsmConfig,
    provider: Sm2Provider,
    keys: KeyPool,
    hashers: HasherPool,
    dispatcher: ModeDispatcher,
}

impl Default for Gmsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Gmsm {
    /// A context with the default distinguishing ID and cold pools.
    pub fn new() -> Self {
        Self::with_config(GmsmConfig::default())
    }

    /// A context built from `config`.
    pub fn with_config(config: GmsmConfig) -> Self {
        debug!(
            key_pool_prewarm = config.key_pool_prewarm,
            hasher_pool_prewarm = config.hasher_pool_prewarm,
            "gmsm context created"
        );
        Self {
            provider: Sm2Provider::new(config.distinguishing_id.clone()),
            keys: KeyPool::with_capacity(config.key_pool_prewarm),
            hashers: HasherPool::with_capacity(config.hasher_pool_prewarm),
            dispatcher: ModeDispatcher::new(),
            config,
        }
    }

    pub fn config(&self) -> &GmsmConfig {
        &self.config
    }

    pub fn provider(&self) -> &Sm2Provider {
        &self.provider
    }

    pub fn key_pool(&self) -> &KeyPool {
        &self.keys
    }

    pub fn hasher_pool(&self) -> &HasherPool {
        &self.hashers
    }

    /// A batch engine bound to this context's provider.
    pub fn batch(&self) -> BatchEngine<'_> {
        BatchEngine::new(&self.provider)
    }

    // -- SM2 ----------------------------------------------------------------

    /// Generate a standalone key pair. Does not touch the key pool; use
    /// [`acquire_key`](Self::acquire_key) for a pooled, auto-scrubbed key.
    pub fn generate_key_pair(&self) -> Result<(Sm2PrivateKey, Sm2PublicKey)> {
        let private = Sm2PrivateKey::generate()?;
        let public = private.public_key().clone();
        Ok((private, public))
    }

    /// Borrow a fresh key pair from the pool.
    pub fn acquire_key(&self) -> Result<PooledKey<'_>> {
        self.keys.acquire()
    }

    pub fn sign(&self, key: &Sm2PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
        self.provider
            .sign(&mut random::default_source(), key, message)
    }

    pub fn verify(&self, key: &Sm2PublicKey, message: &[u8], signature: &[u8]) -> bool {
        self.provider.verify(key, message, signature)
    }

    pub fn encrypt(&self, key: &Sm2PublicKey, message: &[u8]) -> Result<Vec<u8>> {
        self.provider
            .encrypt(&mut random::default_source(), key, message)
    }

    pub fn decrypt(&self, key: &Sm2PrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.provider.decrypt(key, ciphertext)
    }

    /// Fail-fast: any error discards every signature.
    pub fn batch_sign<M: AsRef<[u8]>>(&self, key: &Sm2PrivateKey, messages: &[M]) -> Result<Vec<Vec<u8>>> {
        self.batch().sign_all(key, messages)
    }

    /// Per-index results. Errors only on a count mismatch.
    pub fn batch_verify<M, S>(&self, key: &Sm2PublicKey, messages: &[M], signatures: &[S]) -> Result<Vec<bool>>
    where
        M: AsRef<[u8]>,
        S: AsRef<[u8]>,
    {
        self.batch().verify_all(key, messages, signatures)
    }

    // -- SM3 ----------------------------------------------------------------

    pub fn hash(&self, data: &[u8]) -> Sm3Digest {
        self.hashers.sum(data)
    }

    /// Streaming hash over a pooled state.
    pub fn hash_writer(&self) -> Sm3Writer<'_> {
        self.hashers.writer()
    }

    // -- SM4 ----------------------------------------------------------------

    pub fn cipher_encrypt(&self, key: &[u8], plaintext: &[u8], mode: CipherMode) -> Result<Vec<u8>> {
        self.dispatcher.encrypt(key, plaintext, mode)
    }

    pub fn cipher_decrypt(&self, key: &[u8], ciphertext: &[u8], mode: CipherMode) -> Result<Vec<u8>> {
        self.dispatcher.decrypt(key, ciphertext, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GmsmError;

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gmsm>();
    }

    #[test]
    fn test_sign_verify_scenario() {
        let gm = Gmsm::new();
        let (private, public) = gm.generate_key_pair().unwrap();

        let sig = gm.sign(&private, b"test data").unwrap();
        assert!(gm.verify(&public, b"test data", &sig));

        let messages = ["Message 1", "Message 2", "Message 3"];
        let mut sigs = gm.batch_sign(&private, &messages).unwrap();
        assert_eq!(gm.batch_verify(&public, &messages, &sigs).unwrap(), vec![true; 3]);

        sigs[1] = b"invalid signature".to_vec();
        assert_eq!(
            gm.batch_verify(&public, &messages, &sigs).unwrap(),
            vec![true, false, true]
        );
    }

    #[test]
    fn test_generate_bypasses_pool() {
        let gm = Gmsm::new();
        let _pair = gm.generate_key_pair().unwrap();
        assert_eq!(gm.key_pool().stats().snapshot().created, 0);
    }

    #[test]
    fn test_pooled_key_signs() {
        let gm = Gmsm::new();
        let key = gm.acquire_key().unwrap();
        let sig = gm.sign(&key, b"pooled").unwrap();
        assert!(gm.verify(key.public_key(), b"pooled", &sig));
        drop(key);
        assert_eq!(gm.key_pool().idle_count(), 1);
    }

    #[test]
    fn test_encrypt_decrypt() {
        let gm = Gmsm::new();
        let (private, public) = gm.generate_key_pair().unwrap();
        let ct = gm.encrypt(&public, b"Hello, SM2!").unwrap();
        assert_eq!(gm.decrypt(&private, &ct).unwrap(), b"Hello, SM2!");
    }

    #[test]
    fn test_hash_paths_agree() {
        let gm = Gmsm::new();
        let mut w = gm.hash_writer();
        w.update(b"Hello, ").unwrap();
        w.update(b"SM3!").unwrap();
        assert_eq!(w.sum().unwrap(), gm.hash(b"Hello, SM3!"));
    }

    #[test]
    fn test_cipher_rejects_bad_key() {
        let gm = Gmsm::new();
        let err = gm
            .cipher_encrypt(b"short", b"data", CipherMode::Ecb)
            .unwrap_err();
        assert!(matches!(err, GmsmError::InvalidKeySize { expected: 16, got: 5 }));
    }

    #[test]
    fn test_config_flows_through() {
        let cfg = GmsmConfig::default()
            .with_distinguishing_id("bob@example.com")
            .with_key_pool_prewarm(2)
            .with_hasher_pool_prewarm(3);
        let gm = Gmsm::with_config(cfg);
        assert_eq!(gm.provider().distinguishing_id(), "bob@example.com");
        assert_eq!(gm.key_pool().idle_count(), 2);
        assert_eq!(gm.hasher_pool().idle_count(), 3);

        // Signatures are bound to the context's distinguishing ID.
        let (private, public) = gm.generate_key_pair().unwrap();
        let sig = gm.sign(&private, b"m").unwrap();
        assert!(!Gmsm::new().verify(&public, b"m", &sig));
    }
}
