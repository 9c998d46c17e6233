//! Local directory-backed cache backend
//!
//! Entries live at `{root}/{key[0:2]}/{key}` so no single directory grows
//! unbounded. Stores write a sibling temp file and rename it into place, so a
//! concurrent reader sees either the old entry or the new one, never a torn
//! write, and the last completed store wins.

use crate::backend::CacheBackend;
use crate::entry::{EntryReader, EntryWriter};
use crate::key::CacheKey;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// File-based cache backend rooted at a directory the caller owns
#[derive(Debug)]
pub struct LocalCacheBackend {
    /// Root directory for cache storage
    root: PathBuf,
    closed: AtomicBool,
}

impl LocalCacheBackend {
    /// Create a backend storing entries beneath `root`.
    ///
    /// The directory is created lazily on first store.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            closed: AtomicBool::new(false),
        }
    }

    /// Root directory of the cache
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the entry for `key` is stored
    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let key = key.as_str();
        let shard = key.get(..2).unwrap_or(key);
        self.root.join(shard).join(key)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::closed(self.description()));
        }
        Ok(())
    }
}

impl CacheBackend for LocalCacheBackend {
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        self.ensure_open()?;
        let path = self.entry_path(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %key, "Local cache miss");
                return Ok(false);
            }
            Err(e) => return Err(Error::io(e, &path, "open")),
        };

        reader
            .read_from(&mut BufReader::new(file))
            .map_err(|e| Error::io(e, &path, "read"))?;
        tracing::debug!(key = %key, path = %path.display(), "Local cache hit");
        Ok(true)
    }

    fn store(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        self.ensure_open()?;
        let path = self.entry_path(key);
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(|e| Error::io(e, dir, "create_dir_all"))?;

        let tmp = tempfile::Builder::new()
            .prefix(".entry-")
            .tempfile_in(dir)
            .map_err(|e| Error::io(e, dir, "create"))?;
        {
            let mut out = BufWriter::new(tmp.as_file());
            writer
                .write_to(&mut out)
                .and_then(|()| out.flush())
                .map_err(|e| Error::io(e, tmp.path(), "write"))?;
        }
        tmp.persist(&path)
            .map_err(|e| Error::io(e.error, &path, "rename"))?;

        tracing::debug!(key = %key, path = %path.display(), "Local cache entry stored");
        Ok(())
    }

    fn description(&self) -> String {
        format!("local directory cache at {}", self.root.display())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
