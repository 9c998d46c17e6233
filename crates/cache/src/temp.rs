//! Scratch files for materializing cache entries

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Hands out uniquely named temporary files beneath a base directory.
///
/// Each file is deleted when its [`NamedTempFile`] handle is dropped, which
/// also happens while unwinding.
#[derive(Debug, Clone)]
pub struct TemporaryFileProvider {
    base: PathBuf,
}

impl TemporaryFileProvider {
    /// Create files beneath `base`
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Create files in the system temporary directory
    #[must_use]
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Directory new files are created in
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Create an empty file named `{prefix}{random}{suffix}`.
    ///
    /// The base directory is created if it does not exist yet.
    pub fn create_temporary_file(&self, prefix: &str, suffix: &str) -> Result<NamedTempFile> {
        std::fs::create_dir_all(&self.base)
            .map_err(|e| Error::io(e, &self.base, "create_dir_all"))?;
        tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.base)
            .map_err(|e| Error::io(e, &self.base, "create"))
    }
}

impl Default for TemporaryFileProvider {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_are_unique_and_named() {
        let tmp = TempDir::new().unwrap();
        let provider = TemporaryFileProvider::new(tmp.path().join("scratch"));

        let a = provider.create_temporary_file("strata_cache", "entry").unwrap();
        let b = provider.create_temporary_file("strata_cache", "entry").unwrap();

        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("strata_cache"));
        assert!(name.ends_with("entry"));
        assert_eq!(a.path().parent(), Some(provider.base_dir()));
    }

    #[test]
    fn test_file_removed_on_drop() {
        let tmp = TempDir::new().unwrap();
        let provider = TemporaryFileProvider::new(tmp.path());

        let file = provider.create_temporary_file("x", ".tmp").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }
}
