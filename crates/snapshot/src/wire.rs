//! Primitive wire encoding shared by every snapshot codec
//!
//! Primitives are framed with `bincode`'s standard configuration:
//! - small int: varint, one byte below 251
//! - string: varint byte length followed by UTF-8 bytes
//! - bytes: varint length followed by the bytes
//!
//! Every decode is bounded by [`MAX_FIELD_BYTES`], so a corrupt length
//! prefix fails instead of allocating.

use crate::{Error, Result};
use bincode::config::Config;
use bincode::error::{DecodeError, EncodeError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{ErrorKind, Read, Write};

/// Upper bound on the encoded size of a single field
pub const MAX_FIELD_BYTES: usize = 64 * 1024 * 1024;

fn wire_config() -> impl Config {
    bincode::config::standard().with_limit::<MAX_FIELD_BYTES>()
}

/// Writes primitives to a byte sink
pub struct Encoder<'a> {
    sink: &'a mut dyn Write,
}

impl<'a> Encoder<'a> {
    /// Encode into `sink`
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self { sink }
    }

    /// Write any serde value in the wire framing
    pub fn write_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        bincode::serde::encode_into_std_write(value, &mut self.sink, wire_config())
            .map(|_| ())
            .map_err(encode_error)
    }

    /// Write a non-negative integer in varint form
    pub fn write_small_int(&mut self, value: u32) -> Result<()> {
        self.write_value(&value)
    }

    /// Write a length as a small int
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| Error::malformed(format!("length {len} does not fit the wire format")))?;
        self.write_small_int(len)
    }

    /// Write a length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_value(value)
    }

    /// Write a length-prefixed byte block
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.write_value(value)
    }
}

/// Reads primitives from a byte source
pub struct Decoder<'a> {
    source: &'a mut dyn Read,
}

impl<'a> Decoder<'a> {
    /// Decode from `source`
    pub fn new(source: &'a mut dyn Read) -> Self {
        Self { source }
    }

    /// Read a serde value written by [`Encoder::write_value`]
    pub fn read_value<T: DeserializeOwned>(&mut self) -> Result<T> {
        bincode::serde::decode_from_std_read(&mut self.source, wire_config()).map_err(decode_error)
    }

    /// Read a varint-encoded non-negative integer
    pub fn read_small_int(&mut self) -> Result<u32> {
        self.read_value()
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        self.read_value()
    }

    /// Read a length-prefixed byte block
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.read_value()
    }
}

fn encode_error(err: EncodeError) -> Error {
    match err {
        EncodeError::Io { inner, .. } => Error::io_no_path(inner, "write"),
        other => Error::malformed(format!("cannot encode value: {other}")),
    }
}

fn decode_error(err: DecodeError) -> Error {
    match err {
        DecodeError::Io { inner, .. } if inner.kind() != ErrorKind::UnexpectedEof => {
            Error::io_no_path(inner, "read")
        }
        DecodeError::Io { .. } | DecodeError::UnexpectedEnd { .. } => {
            Error::malformed("unexpected end of input")
        }
        other => Error::malformed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(f: impl FnOnce(&mut Encoder<'_>) -> Result<()>) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut Encoder::new(&mut out)).unwrap();
        out
    }

    #[test]
    fn test_small_int_encoding() {
        assert_eq!(encode(|e| e.write_small_int(0)), vec![0x00]);
        assert_eq!(encode(|e| e.write_small_int(250)), vec![250]);
        assert_eq!(encode(|e| e.write_small_int(251)), vec![0xfb, 251, 0]);
        assert_eq!(
            encode(|e| e.write_small_int(u32::MAX)),
            vec![0xfc, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_small_int_decoding() {
        for value in [0, 1, 127, 250, 251, 300, 65_536, u32::MAX] {
            let bytes = encode(|e| e.write_small_int(value));
            let mut slice = bytes.as_slice();
            assert_eq!(Decoder::new(&mut slice).read_small_int().unwrap(), value);
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn test_small_int_overflow_rejected() {
        // u64 marker where a u32 is expected
        let mut slice: &[u8] = &[0xfd, 1, 0, 0, 0, 1, 0, 0, 0];
        let err = Decoder::new(&mut slice).read_small_int().unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_string_layout() {
        assert_eq!(encode(|e| e.write_string("héllo")), b"\x06h\xc3\xa9llo".to_vec());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let bytes = encode(|e| e.write_bytes(&[0, 1, 255]));
        let mut slice = bytes.as_slice();
        assert_eq!(Decoder::new(&mut slice).read_bytes().unwrap(), vec![0, 1, 255]);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_truncated_string_is_malformed() {
        let mut slice: &[u8] = b"\x05ab";
        let err = Decoder::new(&mut slice).read_string().unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_huge_length_prefix_is_malformed() {
        // claims a string of ~4 GiB
        let mut slice: &[u8] = &[0xfc, 0xf0, 0xff, 0xff, 0xff, b'a'];
        let err = Decoder::new(&mut slice).read_string().unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut slice: &[u8] = &[0x02, 0xc3, 0x28];
        let err = Decoder::new(&mut slice).read_string().unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let mut slice: &[u8] = &[];
        let err = Decoder::new(&mut slice).read_small_int().unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }
}
