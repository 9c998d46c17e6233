//! Cache Backend Abstraction
//!
//! Defines the `CacheBackend` trait implemented by the local directory cache,
//! by remote transports, and by the composing [`DispatchingCache`].
//!
//! [`DispatchingCache`]: crate::DispatchingCache

use crate::Result;
use crate::entry::{EntryReader, EntryWriter};
use crate::key::CacheKey;
use std::sync::Arc;

/// Content-addressed artifact store.
///
/// Implementations must be thread-safe (`Send + Sync`): one backend instance
/// is shared by every concurrently executing unit of work. All methods block
/// the calling thread.
pub trait CacheBackend: Send + Sync {
    /// Stream the entry stored under `key` into `reader`.
    ///
    /// Returns `Ok(false)` when there is no such entry; a miss is not an error.
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool>;

    /// Store the artifact produced by `writer` under `key`, replacing any
    /// existing entry
    fn store(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()>;

    /// Human-readable identity for diagnostics
    fn description(&self) -> String;

    /// Release backend resources. Calling `close` more than once is allowed.
    fn close(&self) -> Result<()>;
}

impl<B: CacheBackend + ?Sized> CacheBackend for Box<B> {
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        (**self).load(key, reader)
    }

    fn store(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        (**self).store(key, writer)
    }

    fn description(&self) -> String {
        (**self).description()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

impl<B: CacheBackend + ?Sized> CacheBackend for Arc<B> {
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        (**self).load(key, reader)
    }

    fn store(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        (**self).store(key, writer)
    }

    fn description(&self) -> String {
        (**self).description()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

/// Serves loads from an inner backend and ignores stores.
///
/// Used for a tier that is read from but not pushed to.
#[derive(Debug)]
pub struct ReadOnlyCacheBackend<B> {
    inner: B,
}

impl<B: CacheBackend> ReadOnlyCacheBackend<B> {
    /// Wrap `inner`
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    /// The wrapped backend
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: CacheBackend> CacheBackend for ReadOnlyCacheBackend<B> {
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        self.inner.load(key, reader)
    }

    fn store(&self, key: &CacheKey, _writer: &dyn EntryWriter) -> Result<()> {
        tracing::debug!(
            key = %key,
            backend = %self.inner.description(),
            "Cache write skipped, pushing disabled"
        );
        Ok(())
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }
}
