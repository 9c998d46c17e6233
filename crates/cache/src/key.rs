//! Cache keys and their deterministic construction

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use strata_fingerprint::{ContentDigest, HashAccumulator};
use strata_snapshot::{InputPropertyMap, hash_properties};

/// Identifier under which a build artifact is stored.
///
/// Opaque to the cache: backends only compare it and use it as a name.
/// Restricted to `[0-9A-Za-z_-]` so it is safe as a file name or URL segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validate an externally produced key
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::configuration("Cache key must not be empty"));
        }
        if let Some(bad) = key
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::configuration(format!(
                "Cache key '{key}' contains invalid character '{bad}'"
            )));
        }
        Ok(Self(key))
    }

    /// The key as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ContentDigest> for CacheKey {
    fn from(digest: ContentDigest) -> Self {
        Self(digest.to_hex())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Folds everything that identifies a unit of work into a [`CacheKey`].
///
/// Input files are keyed by caller-chosen names (normally paths relative to
/// the project) so that keys match across machines. Registration order does
/// not matter.
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    identity: String,
    files: BTreeMap<String, ContentDigest>,
    properties: Option<ContentDigest>,
}

impl CacheKeyBuilder {
    /// Start a key for the unit of work named `identity` (e.g. a task path)
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            files: BTreeMap::new(),
            properties: None,
        }
    }

    /// Add one input file's fingerprint
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, digest: ContentDigest) -> Self {
        self.files.insert(name.into(), digest);
        self
    }

    /// Add several input file fingerprints
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = (S, ContentDigest)>,
        S: Into<String>,
    {
        self.files
            .extend(files.into_iter().map(|(name, digest)| (name.into(), digest)));
        self
    }

    /// Add the non-file input properties
    #[must_use]
    pub fn properties(mut self, properties: &InputPropertyMap) -> Self {
        self.properties = Some(hash_properties(properties));
        self
    }

    /// Compute the key
    #[must_use]
    pub fn build(self) -> CacheKey {
        let mut hasher = HashAccumulator::new();
        hasher.put_str(&self.identity);
        hasher.put_u64(self.files.len() as u64);
        for (name, digest) in &self.files {
            hasher.put_str(name);
            hasher.put_digest(digest);
        }
        match &self.properties {
            Some(digest) => {
                hasher.put_u32(1);
                hasher.put_digest(digest);
            }
            None => hasher.put_u32(0),
        }
        CacheKey::from(hasher.finish())
    }
}
