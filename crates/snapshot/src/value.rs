//! Captured values of non-file task inputs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use strata_fingerprint::{ContentDigest, HashAccumulator};

/// Input property name to captured value.
///
/// Ordered by name, so iteration (and therefore hashing and encoding) is
/// stable regardless of the order properties were registered in.
pub type InputPropertyMap = BTreeMap<String, ValueSnapshot>;

/// Generic structured value, stored through a pluggable
/// [`ObjectCodec`](crate::ObjectCodec)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueValue(serde_json::Value);

impl OpaqueValue {
    /// Wrap an already structured value
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Capture any serializable value.
    ///
    /// Fails for values serde cannot represent structurally, such as maps
    /// with non-string keys.
    pub fn capture<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Self)
    }

    /// The wrapped value
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Unwrap the value
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// State of one task input property when it was last observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSnapshot {
    /// The property had no value
    Null,
    /// A plain string value
    String(String),
    /// Anything else, kept in generic structured form
    Opaque(OpaqueValue),
}

impl ValueSnapshot {
    /// Snapshot a string value
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Snapshot an optional value, mapping `None` to [`ValueSnapshot::Null`].
    ///
    /// Strings are captured as [`ValueSnapshot::String`]; everything else as
    /// [`ValueSnapshot::Opaque`].
    pub fn capture<T: Serialize + ?Sized>(value: Option<&T>) -> serde_json::Result<Self> {
        let Some(value) = value else {
            return Ok(Self::Null);
        };
        Ok(match OpaqueValue::capture(value)?.into_value() {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::String(s) => Self::String(s),
            other => Self::Opaque(OpaqueValue::new(other)),
        })
    }

    /// Fold this snapshot into a hash.
    ///
    /// Each variant is prefixed with a distinct marker so that, for example,
    /// `Null` and `String("")` never collide.
    pub fn append_to_hasher(&self, hasher: &mut HashAccumulator) {
        match self {
            Self::Null => hasher.put_u32(0),
            Self::String(s) => {
                hasher.put_u32(1);
                hasher.put_str(s);
            }
            Self::Opaque(v) => {
                hasher.put_u32(2);
                // serde_json objects are key-sorted, so the rendering is canonical
                hasher.put_str(&v.to_string());
            }
        }
    }
}

impl fmt::Display for ValueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => f.write_str(s),
            Self::Opaque(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Digest of a whole property map: names and values in name order
#[must_use]
pub fn hash_properties(properties: &InputPropertyMap) -> ContentDigest {
    let mut hasher = HashAccumulator::new();
    hasher.put_u64(properties.len() as u64);
    for (name, value) in properties {
        hasher.put_str(name);
        value.append_to_hasher(&mut hasher);
    }
    hasher.finish()
}
