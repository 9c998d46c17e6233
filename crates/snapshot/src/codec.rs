//! Pluggable codec for opaque snapshot values

use crate::value::OpaqueValue;
use crate::wire::{Decoder, Encoder};
use crate::{Error, Result};

/// Encodes and decodes [`OpaqueValue`]s inside a snapshot stream.
///
/// A codec owns the bytes it writes: whatever `write` emits, `read` must
/// consume exactly.
pub trait ObjectCodec: Send + Sync {
    /// Write `value`; fails if the value is not representable
    fn write(&self, encoder: &mut Encoder<'_>, value: &OpaqueValue) -> Result<()>;

    /// Read a value previously written by [`ObjectCodec::write`]
    fn read(&self, decoder: &mut Decoder<'_>) -> Result<OpaqueValue>;
}

/// Stores opaque values as a length-prefixed compact JSON document.
///
/// Floats are rendered in shortest round-trip form and parsed back exactly,
/// so a decoded value compares and hashes equal to the one written.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonObjectCodec;

impl ObjectCodec for JsonObjectCodec {
    fn write(&self, encoder: &mut Encoder<'_>, value: &OpaqueValue) -> Result<()> {
        let json = serde_json::to_string(value.as_value())
            .map_err(|e| Error::malformed(format!("cannot encode value as JSON: {e}")))?;
        encoder.write_string(&json)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<OpaqueValue> {
        let json = decoder.read_string()?;
        serde_json::from_str(&json)
            .map(OpaqueValue::new)
            .map_err(|e| Error::malformed(format!("invalid JSON value: {e}")))
    }
}
