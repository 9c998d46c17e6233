//! Binary encoding of input property maps
//!
//! Layout: a small-int entry count, then for each entry its name (string)
//! followed by a small-int tag and the tag's payload:
//!
//! | tag | variant  | payload                          |
//! |-----|----------|----------------------------------|
//! | 0   | `Null`   | none                             |
//! | 1   | `String` | one string                       |
//! | 2   | `Opaque` | whatever the [`ObjectCodec`] writes |
//!
//! Any other tag is a format error.

use crate::codec::{JsonObjectCodec, ObjectCodec};
use crate::value::{InputPropertyMap, ValueSnapshot};
use crate::wire::{Decoder, Encoder};
use crate::{Error, Result};
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

const NULL_SNAPSHOT: u32 = 0;
const STRING_SNAPSHOT: u32 = 1;
const OPAQUE_SNAPSHOT: u32 = 2;

/// Encodes and decodes [`InputPropertyMap`]s
#[derive(Clone)]
pub struct InputPropertiesCodec {
    objects: Arc<dyn ObjectCodec>,
}

impl Default for InputPropertiesCodec {
    fn default() -> Self {
        Self::new(JsonObjectCodec)
    }
}

impl InputPropertiesCodec {
    /// Create a codec delegating opaque values to `objects`
    pub fn new(objects: impl ObjectCodec + 'static) -> Self {
        Self {
            objects: Arc::new(objects),
        }
    }

    /// Write `properties` to `sink`.
    ///
    /// An opaque value the object codec cannot store is reported as
    /// [`Error::PropertyNotSerializable`] naming the property.
    pub fn encode(&self, sink: &mut dyn Write, properties: &InputPropertyMap) -> Result<()> {
        let mut encoder = Encoder::new(sink);
        encoder.write_len(properties.len())?;
        for (name, snapshot) in properties {
            encoder.write_string(name)?;
            self.write_entry(&mut encoder, name, snapshot)?;
        }
        Ok(())
    }

    /// Read a property map from `source`
    pub fn decode(&self, source: &mut dyn Read) -> Result<InputPropertyMap> {
        let mut decoder = Decoder::new(source);
        let size = decoder.read_small_int()?;
        let mut properties = InputPropertyMap::new();
        for _ in 0..size {
            let name = decoder.read_string()?;
            let snapshot = self.read_snapshot(&mut decoder)?;
            if properties.insert(name.clone(), snapshot).is_some() {
                return Err(Error::malformed(format!(
                    "duplicate input property '{name}'"
                )));
            }
        }
        Ok(properties)
    }

    /// Encode into a fresh buffer
    pub fn encode_to_vec(&self, properties: &InputPropertyMap) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(&mut out, properties)?;
        Ok(out)
    }

    /// Decode a complete buffer; trailing bytes are a format error
    pub fn decode_from_slice(&self, mut bytes: &[u8]) -> Result<InputPropertyMap> {
        let properties = self.decode(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(Error::malformed(format!(
                "{} trailing bytes after input properties",
                bytes.len()
            )));
        }
        Ok(properties)
    }

    fn read_snapshot(&self, decoder: &mut Decoder<'_>) -> Result<ValueSnapshot> {
        match decoder.read_small_int()? {
            NULL_SNAPSHOT => Ok(ValueSnapshot::Null),
            STRING_SNAPSHOT => Ok(ValueSnapshot::String(decoder.read_string()?)),
            OPAQUE_SNAPSHOT => Ok(ValueSnapshot::Opaque(self.objects.read(decoder)?)),
            tag => Err(Error::UnknownSnapshotTag { tag }),
        }
    }

    fn write_entry(
        &self,
        encoder: &mut Encoder<'_>,
        name: &str,
        snapshot: &ValueSnapshot,
    ) -> Result<()> {
        match snapshot {
            ValueSnapshot::Null => encoder.write_small_int(NULL_SNAPSHOT),
            ValueSnapshot::String(value) => {
                encoder.write_small_int(STRING_SNAPSHOT)?;
                encoder.write_string(value)
            }
            ValueSnapshot::Opaque(value) => {
                encoder.write_small_int(OPAQUE_SNAPSHOT)?;
                self.objects.write(encoder, value).map_err(|e| {
                    Error::property_not_serializable(name, value.to_string(), describe(&e))
                })
            }
        }
    }
}

/// Render an error together with its immediate cause
fn describe(err: &Error) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

impl fmt::Debug for InputPropertiesCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputPropertiesCodec").finish_non_exhaustive()
    }
}
