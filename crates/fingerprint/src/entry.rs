//! Filesystem entry metadata consumed by the fingerprinter

use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Kind of a filesystem entry at the time it was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A regular file (or a symlink resolving to one)
    RegularFile,
    /// A directory
    Directory,
    /// Nothing exists at the path
    Missing,
}

/// What the fingerprinter needs to know about one filesystem entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDetails {
    /// Absolute or caller-relative path used to read the entry
    pub path: PathBuf,
    /// Logical name, normally the final path component
    pub name: String,
    /// Entry kind
    pub kind: FileKind,
}

impl EntryDetails {
    /// Describe an entry without touching the filesystem
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: FileKind) -> Self {
        let path = path.into();
        let name = logical_name(&path);
        Self { path, name, kind }
    }

    /// Read the entry's metadata from disk, following symlinks.
    ///
    /// A path that does not exist is reported as [`FileKind::Missing`];
    /// any other metadata failure is an error.
    pub fn inspect(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let kind = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => FileKind::Directory,
            Ok(_) => FileKind::RegularFile,
            Err(e) if e.kind() == ErrorKind::NotFound => FileKind::Missing,
            Err(e) => return Err(Error::io(e, &path, "stat")),
        };
        Ok(Self::new(path, kind))
    }

    /// Whether the entry is a regular file
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::RegularFile
    }
}

fn logical_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}
