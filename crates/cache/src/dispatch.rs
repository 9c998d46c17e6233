//! Two-tier cache dispatch
//!
//! [`DispatchingCache`] puts one local and one remote backend behind the
//! [`CacheBackend`] contract. Reads try local first and fall back to remote.
//! Writes go to whichever tiers have pushing enabled. A failed load or store
//! is reported as [`Error::Entry`] naming the key.

use crate::backend::CacheBackend;
use crate::entry::{EntryReader, EntryWriter, FileEntryWriter};
use crate::key::CacheKey;
use crate::temp::TemporaryFileProvider;
use crate::{Error, Result};
use std::fmt;
use std::io::{BufWriter, Write};

/// Prefix and suffix of the scratch file used to fan an entry out to both tiers
const SCRATCH_PREFIX: &str = "strata_cache";
const SCRATCH_SUFFIX: &str = "entry";

/// Composes a local and a remote backend.
///
/// Holds no mutable state beyond what is set at construction, so one instance
/// can be shared by every concurrently executing unit of work.
pub struct DispatchingCache {
    local: Box<dyn CacheBackend>,
    push_to_local: bool,
    remote: Box<dyn CacheBackend>,
    push_to_remote: bool,
    temp_files: TemporaryFileProvider,
}

impl DispatchingCache {
    /// Compose `local` and `remote`, each with its own push flag.
    ///
    /// `temp_files` supplies the scratch file used when both tiers are pushed to.
    pub fn new(
        temp_files: TemporaryFileProvider,
        local: impl CacheBackend + 'static,
        push_to_local: bool,
        remote: impl CacheBackend + 'static,
        push_to_remote: bool,
    ) -> Self {
        Self {
            local: Box::new(local),
            push_to_local,
            remote: Box::new(remote),
            push_to_remote,
            temp_files,
        }
    }

    /// Whether new entries are written to the local tier
    #[must_use]
    pub fn pushes_to_local(&self) -> bool {
        self.push_to_local
    }

    /// Whether new entries are written to the remote tier
    #[must_use]
    pub fn pushes_to_remote(&self) -> bool {
        self.push_to_remote
    }

    fn load_from_tiers(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        if self.local.load(key, reader)? {
            tracing::debug!(backend = %self.local.description(), "Cache hit");
            return Ok(true);
        }
        let found = self.remote.load(key, reader)?;
        if found {
            tracing::debug!(backend = %self.remote.description(), "Cache hit");
        } else {
            tracing::debug!("Cache miss");
        }
        Ok(found)
    }

    fn store_to_tiers(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        match (self.push_to_local, self.push_to_remote) {
            (true, true) => self.store_to_both(key, writer),
            (true, false) => {
                tracing::debug!(backend = %self.local.description(), "Storing cache entry");
                self.local.store(key, writer)
            }
            (false, true) => {
                tracing::debug!(backend = %self.remote.description(), "Storing cache entry");
                self.remote.store(key, writer)
            }
            (false, false) => {
                tracing::debug!("Pushing disabled for both caches, entry not stored");
                Ok(())
            }
        }
    }

    /// Materialize the entry once, then replay it into both tiers
    fn store_to_both(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        let scratch = self
            .temp_files
            .create_temporary_file(SCRATCH_PREFIX, SCRATCH_SUFFIX)?;
        {
            let mut out = BufWriter::new(scratch.as_file());
            writer
                .write_to(&mut out)
                .and_then(|()| out.flush())
                .map_err(|e| Error::io(e, scratch.path(), "write cache entry"))?;
        }

        let copier = FileEntryWriter::new(scratch.path());
        self.local.store(key, &copier)?;
        tracing::debug!(backend = %self.local.description(), "Stored cache entry");
        self.remote.store(key, &copier)?;
        tracing::debug!(backend = %self.remote.description(), "Stored cache entry");
        Ok(())
    }
}

fn decorate(description: String, push: bool) -> String {
    if push {
        format!("{description} (pushing enabled)")
    } else {
        description
    }
}

impl CacheBackend for DispatchingCache {
    #[tracing::instrument(name = "cache_load", skip_all, fields(key = %key))]
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        self.load_from_tiers(key, reader)
            .map_err(|e| e.for_entry("load", key.as_str()))
    }

    #[tracing::instrument(name = "cache_store", skip_all, fields(key = %key))]
    fn store(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        self.store_to_tiers(key, writer)
            .map_err(|e| e.for_entry("store", key.as_str()))
    }

    fn description(&self) -> String {
        format!(
            "{} and {}",
            decorate(self.local.description(), self.push_to_local),
            decorate(self.remote.description(), self.push_to_remote)
        )
    }

    fn close(&self) -> Result<()> {
        let mut failures = Vec::new();
        for backend in [&self.local, &self.remote] {
            if let Err(error) = backend.close() {
                tracing::warn!(
                    backend = %backend.description(),
                    error = %error,
                    "Failed to close build cache backend"
                );
                failures.push(error);
            }
        }
        Error::aggregate("closing build cache backends", failures)
    }
}

impl fmt::Debug for DispatchingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchingCache")
            .field("local", &self.local.description())
            .field("push_to_local", &self.push_to_local)
            .field("remote", &self.remote.description())
            .field("push_to_remote", &self.push_to_remote)
            .field("temp_files", &self.temp_files)
            .finish()
    }
}
