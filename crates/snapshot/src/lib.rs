//! Snapshots of non-file task inputs
//!
//! Task inputs that are not files (strings, flags, structured options) are
//! captured as [`ValueSnapshot`]s keyed by property name. This crate provides:
//! - The snapshot model and its hashing ([`hash_properties`])
//! - A tagged binary encoding ([`InputPropertiesCodec`]) with a pluggable
//!   codec for opaque values ([`ObjectCodec`])
//! - Versioned snapshot files that degrade to "no prior state" on mismatch

// TODO(snapshot-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

pub mod codec;
mod error;
pub mod file;
pub mod properties;
pub mod value;
pub mod wire;

pub use codec::{JsonObjectCodec, ObjectCodec};
pub use error::{Error, Result};
pub use file::{SNAPSHOT_FORMAT_VERSION, read_snapshot_file, write_snapshot_file};
pub use properties::InputPropertiesCodec;
pub use value::{InputPropertyMap, OpaqueValue, ValueSnapshot, hash_properties};
pub use wire::{Decoder, Encoder};
