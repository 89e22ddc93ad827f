//! Incremental SM3 over a pooled state.
//!
//! [`Sm3Writer`] owns one [`PooledHasher`] until it is closed. `close` hands
//! the state back exactly once; every call after that is a
//! [`GmsmError::WriterClosed`]. Dropping an open writer closes it.

use std::io;

use tracing::warn;

use crate::error::{GmsmError, Result};

use super::pool::PooledHasher;
use super::Sm3Digest;

/// Streaming SM3 hasher. Also implements [`std::io::Write`], so it can sit
/// at the end of `io::copy`.
#[derive(Debug)]
pub struct Sm3Writer<'a> {
    hasher: Option<PooledHasher<'a>>,
}

impl<'a> Sm3Writer<'a> {
    pub(crate) fn new(hasher: PooledHasher<'a>) -> Self {
        Self {
            hasher: Some(hasher),
        }
    }

    /// Absorb `data`.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        self.open_mut()?.update(data);
        Ok(())
    }

    /// Digest of everything written so far. Repeatable; writing may
    /// continue afterwards.
    pub fn sum(&self) -> Result<Sm3Digest> {
        match &self.hasher {
            Some(hasher) => Ok(hasher.sum()),
            None => Err(closed()),
        }
    }

    /// Forget everything written so far.
    pub fn reset(&mut self) -> Result<()> {
        self.open_mut()?.reset();
        Ok(())
    }

    /// Return the state to its pool. Calling this again is harmless.
    pub fn close(&mut self) {
        match self.hasher.take() {
            Some(hasher) => hasher.release(),
            None => {
                if cfg!(debug_assertions) {
                    warn!("Sm3Writer closed twice");
                }
            }
        }
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.hasher.is_none()
    }

    fn open_mut(&mut self) -> Result<&mut PooledHasher<'a>> {
        self.hasher.as_mut().ok_or_else(closed)
    }
}

fn closed() -> GmsmError {
    if cfg!(debug_assertions) {
        warn!("Sm3Writer used after close");
    }
    GmsmError::WriterClosed
}

impl io::Write for Sm3Writer<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
