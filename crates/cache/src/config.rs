//! Build Cache Configuration
//!
//! Which cache tiers are in use, whether each receives new entries, and
//! where the local tier keeps its files. Loadable from TOML:
//!
//! ```toml
//! [local]
//! enabled = true
//! push = true
//! directory = "/var/cache/strata"
//!
//! [remote]
//! enabled = true
//! push = false
//! ```

use crate::backend::{CacheBackend, ReadOnlyCacheBackend};
use crate::dispatch::DispatchingCache;
use crate::local::LocalCacheBackend;
use crate::temp::TemporaryFileProvider;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Local cache directory relative to the project root when none is configured
pub const DEFAULT_LOCAL_CACHE_DIR: &str = ".strata/build-cache";

/// Settings for the local directory tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalCacheConfig {
    /// Read from the local tier
    pub enabled: bool,
    /// Write new entries to the local tier
    pub push: bool,
    /// Cache directory (default: `<project>/.strata/build-cache`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            push: true,
            directory: None,
        }
    }
}

/// Settings for the remote tier. The transport itself is supplied by the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteCacheConfig {
    /// Read from the remote tier
    pub enabled: bool,
    /// Write new entries to the remote tier
    pub push: bool,
}

/// Build cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildCacheConfig {
    /// Local tier settings
    pub local: LocalCacheConfig,
    /// Remote tier settings
    pub remote: RemoteCacheConfig,
}

impl BuildCacheConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| {
            Error::configuration(format!("invalid build cache configuration: {e}"))
        })
    }

    /// Read and parse the TOML file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        toml::from_str(&source).map_err(|e| {
            Error::configuration(format!(
                "invalid build cache configuration in {}: {e}",
                path.display()
            ))
        })
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::configuration(e.to_string()))
    }

    /// Enable or disable the local tier
    #[must_use]
    pub fn with_local_enabled(mut self, enabled: bool) -> Self {
        self.local.enabled = enabled;
        self
    }

    /// Enable or disable pushing to the local tier
    #[must_use]
    pub fn with_local_push(mut self, push: bool) -> Self {
        self.local.push = push;
        self
    }

    /// Set the local cache directory
    #[must_use]
    pub fn with_local_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.local.directory = Some(directory.into());
        self
    }

    /// Enable or disable the remote tier
    #[must_use]
    pub fn with_remote_enabled(mut self, enabled: bool) -> Self {
        self.remote.enabled = enabled;
        self
    }

    /// Enable or disable pushing to the remote tier
    #[must_use]
    pub fn with_remote_push(mut self, push: bool) -> Self {
        self.remote.push = push;
        self
    }

    /// Get the effective local cache directory. Relative paths are resolved
    /// against `project_root`.
    #[must_use]
    pub fn effective_local_directory(&self, project_root: &Path) -> PathBuf {
        match &self.local.directory {
            Some(dir) => project_root.join(dir),
            None => project_root.join(DEFAULT_LOCAL_CACHE_DIR),
        }
    }
}

/// Compose the backend described by `config`.
///
/// Returns `Ok(None)` when no tier is enabled. A single enabled tier is used
/// directly, read-only if pushing to it is off. Two enabled tiers are combined
/// in a [`DispatchingCache`]. Enabling the remote tier without supplying
/// `remote` is a configuration error.
pub fn build_cache_service(
    config: &BuildCacheConfig,
    project_root: &Path,
    temp_files: TemporaryFileProvider,
    remote: Option<Box<dyn CacheBackend>>,
) -> Result<Option<Box<dyn CacheBackend>>> {
    let remote = match (config.remote.enabled, remote) {
        (true, Some(backend)) => Some(backend),
        (true, None) => {
            return Err(Error::configuration(
                "remote build cache is enabled but no remote backend is available",
            ));
        }
        (false, Some(backend)) => {
            tracing::debug!(
                backend = %backend.description(),
                "Remote build cache is disabled, ignoring configured backend"
            );
            None
        }
        (false, None) => None,
    };

    let local = config.local.enabled.then(|| {
        LocalCacheBackend::new(config.effective_local_directory(project_root))
    });

    let service: Box<dyn CacheBackend> = match (local, remote) {
        (None, None) => {
            tracing::debug!("Build cache disabled, no tier enabled");
            return Ok(None);
        }
        (Some(local), Some(remote)) => Box::new(DispatchingCache::new(
            temp_files,
            local,
            config.local.push,
            remote,
            config.remote.push,
        )),
        (Some(local), None) => read_only_unless(local, config.local.push),
        (None, Some(remote)) => read_only_unless(remote, config.remote.push),
    };

    tracing::debug!(service = %service.description(), "Using build cache");
    Ok(Some(service))
}

fn read_only_unless(backend: impl CacheBackend + 'static, push: bool) -> Box<dyn CacheBackend> {
    if push {
        Box::new(backend)
    } else {
        Box::new(ReadOnlyCacheBackend::new(backend))
    }
}
