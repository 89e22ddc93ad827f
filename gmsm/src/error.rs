//! # Errors
//!
//! One error type for the whole shim. Every fallible operation returns
//! [`Result<T>`], and every failure goes straight back to the immediate
//! caller: nothing in here retries, and nothing logs an error on the way out.
//!
//! Failures raised by the underlying SM2 primitives are carried through
//! unchanged in [`GmsmError::Curve`] and [`GmsmError::Signature`] so callers
//! can still inspect them.
//!
//! Messages are deliberately short and never include key material.

use sm2::dsa::signature;
use thiserror::Error;

/// Errors produced by the pools, the dispatcher, the batch engine, and the
/// facade.
#[derive(Debug, Error)]
pub enum GmsmError {
    /// The random source errored or could not fill the requested buffer.
    /// Raised during key generation and signing; never retried internally.
    #[error("random source failed: {0}")]
    RandomSource(#[source] rand_core::Error),

    /// SM4 key of the wrong length. Checked before any cipher call.
    #[error("invalid SM4 key size: expected {expected} bytes, got {got}")]
    InvalidKeySize { expected: usize, got: usize },

    /// A mode selector that doesn't name ECB, CBC, CFB or OFB.
    #[error("unsupported SM4 cipher mode: {0}")]
    UnsupportedMode(String),

    /// `batch_verify` was handed a different number of signatures than
    /// messages. No verification is performed.
    #[error("messages and signatures count mismatch: {messages} messages, {signatures} signatures")]
    CountMismatch { messages: usize, signatures: usize },

    /// Curve-level failure from the SM2 implementation (bad point, bad
    /// scalar, decryption failure).
    #[error("SM2 primitive failure: {0}")]
    Curve(#[from] sm2::elliptic_curve::Error),

    /// Signing-level failure from the SM2 implementation.
    #[error("SM2 signature failure: {0}")]
    Signature(#[from] signature::Error),

    /// Block-cipher padding did not check out on decryption. Wrong key or
    /// corrupted ciphertext; we don't say which.
    #[error("SM4 decryption failed: invalid padding")]
    Padding,

    /// Ciphertext shorter than the mode's framing requires.
    #[error("ciphertext too short: need at least {min} bytes, got {got}")]
    CiphertextTooShort { min: usize, got: usize },

    /// Key bytes that don't decode into a valid SM2 key.
    #[error("invalid SM2 key: {0}")]
    InvalidKey(&'static str),

    /// An incremental hasher was used after `close()`.
    #[error("SM3 writer used after close")]
    WriterClosed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GmsmError>;
