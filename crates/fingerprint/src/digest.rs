//! 128-bit content digests and the incremental accumulator that produces them

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Width of a [`ContentDigest`] in bytes
pub const DIGEST_LEN: usize = 16;

/// Fixed-width fingerprint of some content.
///
/// Equality is byte equality. Rendered as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Wrap raw digest bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = hex::decode(s)
            .map_err(|e| Error::configuration(format!("Invalid digest '{s}': {e}")))?;
        let bytes: [u8; DIGEST_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            Error::configuration(format!(
                "Invalid digest '{s}': expected {DIGEST_LEN} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental "feed bytes, then finish" hasher.
///
/// Identical byte sequences fed in identical order always produce the same
/// digest. Callers are responsible for making the feeding order stable.
/// Backed by SHA-256, truncated to [`DIGEST_LEN`] bytes.
#[derive(Clone, Default)]
pub struct HashAccumulator {
    inner: Sha256,
}

impl HashAccumulator {
    /// Start an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest a single byte slice
    #[must_use]
    pub fn digest_of(bytes: &[u8]) -> ContentDigest {
        let mut hasher = Self::new();
        hasher.put_bytes(bytes);
        hasher.finish()
    }

    /// Feed raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Feed a length-prefixed UTF-8 string.
    ///
    /// The prefix keeps `("ab", "c")` and `("a", "bc")` apart.
    pub fn put_str(&mut self, value: &str) {
        self.put_usize(value.len());
        self.put_bytes(value.as_bytes());
    }

    /// Feed a little-endian u32
    pub fn put_u32(&mut self, value: u32) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Feed a little-endian u64
    pub fn put_u64(&mut self, value: u64) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Feed the raw bytes of another digest
    pub fn put_digest(&mut self, digest: &ContentDigest) {
        self.put_bytes(digest.as_bytes());
    }

    fn put_usize(&mut self, value: usize) {
        self.put_u64(value as u64);
    }

    /// Finalize into a digest
    #[must_use]
    pub fn finish(self) -> ContentDigest {
        let full = self.inner.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&full[..DIGEST_LEN]);
        ContentDigest(bytes)
    }
}

impl fmt::Debug for HashAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashAccumulator").finish_non_exhaustive()
    }
}
