// Copyright (c) 2026 gmsm contributors. MIT License.
// See LICENSE for details.

//! # gmsm: Pooled SM2 / SM3 / SM4
//!
//! A thin layer over the RustCrypto SM2, SM3 and SM4 implementations for
//! services that do a lot of Chinese national-standard cryptography, such as
//! payment gateways and signing services.
//!
//! It doesn't implement any primitive itself. What it adds is:
//!
//! - **Pools.** SM2 key containers and SM3 states are recycled instead of
//!   being allocated per operation. Key material is zeroized every time a
//!   container goes back, whether the caller returned it explicitly, hit an
//!   error, or unwound.
//! - **Batches.** Sign or verify a list of messages with one key, paying
//!   for the key setup once.
//! - **One SM4 entry point.** A single dispatcher for ECB, CBC, CFB and OFB
//!   that checks the key length and frames the IV for you.
//! - **A facade.** [`Gmsm`] owns all of the above. No globals.
//!
//! ## Modules
//!
//! - **sm2**: keys, key pool, provider, batch engine.
//! - **sm3**: hasher pool and streaming writer.
//! - **sm4**: modes and dispatcher.
//! - **facade**: the [`Gmsm`] context.
//! - **random**: where entropy comes from, and how its failures surface.
//! - **stats**: pool counters.
//! - **config**: algorithm constants and [`GmsmConfig`].
//! - **error**: [`GmsmError`].
//!
//! ## Ground rules
//!
//! 1. Errors go to the caller. The library logs lifecycle events at `debug`
//!    and never logs a failure on its way out.
//! 2. Key bytes never reach a log line or a `Debug` string.
//! 3. Every pool is `Send + Sync`; nothing spawns threads.

pub mod config;
pub mod error;
pub mod facade;
pub mod random;
pub mod sm2;
pub mod sm3;
pub mod sm4;
pub mod stats;

pub use crate::config::GmsmConfig;
pub use crate::error::{GmsmError, Result};
pub use crate::facade::Gmsm;
pub use crate::random::{default_source, RandomSource};
pub use crate::sm2::{
    BatchEngine, DomainParams, KeyPool, PooledKey, PublicPoint, Sm2PrivateKey, Sm2Provider, Sm2PublicKey,
};
pub use crate::sm3::{HasherPool, PooledHasher, Sm3Digest, Sm3Writer};
pub use crate::sm4::{CipherMode, ModeDispatcher};
pub use crate::stats::{PoolStats, PoolStatsSnapshot};
