//! # SM2
//!
//! Public-key half of the shim: key types, the pooled key cache, the thin
//! provider over the `sm2` crate, and the batch engine.
//!
//! - **domain**: process-wide curve parameters and the key-generation
//!   reduction.
//! - **keys**: scalar, point and key-pair types that scrub themselves.
//! - **provider**: sign, verify, encrypt, decrypt.
//! - **encryption**: `C1 || C3 || C2` public-key encryption with an SM3 KDF.
//! - **pool**: reusable key containers handed out behind a scoped guard.
//! - **batch**: ordered sign/verify over many messages with one key.

pub mod batch;
pub mod domain;
pub mod encryption;
pub mod keys;
pub mod pool;
pub mod provider;

pub use batch::BatchEngine;
pub use domain::DomainParams;
pub use keys::{PublicPoint, SecretScalar, Sm2PrivateKey, Sm2PublicKey};
pub use pool::{KeyPool, PooledKey};
pub use provider::{Sm2Provider, Sm2Signer, Sm2Verifier};
