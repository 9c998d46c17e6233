//! Two-tier build cache for strata
//!
//! This crate stores and retrieves build artifacts by cache key:
//! - [`CacheKey`] and [`CacheKeyBuilder`] turn fingerprints and input
//!   property snapshots into a deterministic key
//! - [`CacheBackend`] is the contract every storage tier implements
//! - [`LocalCacheBackend`] keeps entries in a directory owned by the caller
//! - [`DispatchingCache`] composes a local and a remote tier, each with its
//!   own push flag
//! - [`CachingState`] records whether a unit of work may use the cache
//!
//! # Overview
//!
//! Loads try the local tier first and only fall back to the remote tier on a
//! miss. Stores go to whichever tiers have pushing enabled. When both do, the
//! artifact is produced once into a scratch file and replayed into each tier,
//! and the scratch file is removed on every exit path.
//!
//! All operations block the calling thread. Backends are `Send + Sync` and a
//! single instance is shared by concurrently executing units of work.

// TODO(cache-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

mod backend;
mod config;
mod dispatch;
mod entry;
mod error;
mod key;
mod local;
mod policy;
mod temp;

#[cfg(test)]
mod test_support;

// Re-export error types at crate root
pub use error::{BoxError, Error, Result};

pub use backend::{CacheBackend, ReadOnlyCacheBackend};
pub use config::{
    BuildCacheConfig, DEFAULT_LOCAL_CACHE_DIR, LocalCacheConfig, RemoteCacheConfig,
    build_cache_service,
};
pub use dispatch::DispatchingCache;
pub use entry::{EntryReader, EntryWriter, FileEntryWriter};
pub use key::{CacheKey, CacheKeyBuilder};
pub use local::LocalCacheBackend;
pub use policy::{CachingState, DisabledReason};
pub use temp::TemporaryFileProvider;
