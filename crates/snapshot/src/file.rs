//! Versioned on-disk snapshot files
//!
//! A snapshot file is a serialized header (the `STRP` magic and a format
//! version) followed by the [`InputPropertiesCodec`] payload. A file from
//! another format version, or one that fails to decode, is treated as "no
//! prior state" so an upgrade forces re-snapshotting instead of failing the
//! build.

use crate::properties::InputPropertiesCodec;
use crate::value::InputPropertyMap;
use crate::wire::{Decoder, Encoder};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Magic bytes identifying a snapshot file
const SNAPSHOT_MAGIC: [u8; 4] = *b"STRP";

/// Current snapshot file format version. Increment on breaking changes to
/// the header or payload format.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Leading record of every snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 4],
    format_version: u32,
}

impl SnapshotHeader {
    const fn current() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            format_version: SNAPSHOT_FORMAT_VERSION,
        }
    }
}

/// Write `properties` to `path`, replacing any previous file atomically
pub fn write_snapshot_file(
    path: &Path,
    properties: &InputPropertyMap,
    codec: &InputPropertiesCodec,
) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| Error::io(e, dir, "create_dir_all"))?;

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(e, dir, "create"))?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        Encoder::new(&mut out).write_value(&SnapshotHeader::current())?;
        codec.encode(&mut out, properties)?;
        out.flush().map_err(|e| Error::io(e, tmp.path(), "flush"))?;
    }
    tmp.persist(path)
        .map_err(|e| Error::io(e.error, path, "rename"))?;
    Ok(())
}

/// Read the snapshot stored at `path`.
///
/// Returns `Ok(None)` when there is no usable prior state: the file is
/// missing, was written by another format version, or is corrupt. Other I/O
/// failures are errors.
pub fn read_snapshot_file(
    path: &Path,
    codec: &InputPropertiesCodec,
) -> Result<Option<InputPropertyMap>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(e, path, "open")),
    };
    let mut input = BufReader::new(file);

    let decoded = read_header(&mut input).and_then(|()| {
        let properties = codec.decode(&mut input)?;
        let mut rest = [0u8; 1];
        match input.read(&mut rest) {
            Ok(0) => Ok(properties),
            Ok(_) => Err(Error::malformed("trailing bytes after input properties")),
            Err(e) => Err(Error::io(e, path, "read")),
        }
    });

    match decoded {
        Ok(properties) => Ok(Some(properties)),
        Err(e) if e.is_corruption() => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Discarding unusable input property snapshot"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn read_header(input: &mut dyn Read) -> Result<()> {
    let header: SnapshotHeader = Decoder::new(input).read_value()?;
    if header.magic != SNAPSHOT_MAGIC {
        return Err(Error::malformed("not a snapshot file"));
    }
    if header.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(Error::VersionMismatch {
            expected: SNAPSHOT_FORMAT_VERSION,
            found: header.format_version,
        });
    }
    Ok(())
}
