//! # SM4
//!
//! Block-cipher modes over the `sm4` crate, each owning its padding and IV
//! framing, and a dispatcher that checks the key and routes by mode.

pub mod dispatch;
pub mod modes;

pub use dispatch::ModeDispatcher;
pub use modes::{CipherMode, Iv, Sm4Key};
