//! Error types for the snapshot crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for snapshot encoding and decoding
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading or writing encoded snapshots
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(strata::snapshot::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write")
        operation: String,
    },

    /// A value tag outside the known set was read
    #[error("Unknown value snapshot tag {tag}")]
    #[diagnostic(
        code(strata::snapshot::unknown_tag),
        help("The persisted state is corrupt or was written by an incompatible version")
    )]
    UnknownSnapshotTag {
        /// The tag that was read
        tag: u32,
    },

    /// Encoded data is structurally invalid
    #[error("Malformed snapshot data: {message}")]
    #[diagnostic(
        code(strata::snapshot::malformed),
        help("The persisted state is corrupt or was written by an incompatible version")
    )]
    Malformed {
        /// Description of the problem
        message: String,
    },

    /// An input property's value could not be stored
    #[error(
        "Unable to store input properties. Property '{property}' with value '{value}' cannot be serialized: {message}"
    )]
    #[diagnostic(
        code(strata::snapshot::not_serializable),
        help("Change the input property '{property}' to a value that can be serialized")
    )]
    PropertyNotSerializable {
        /// Name of the offending property
        property: String,
        /// Rendering of the offending value
        value: String,
        /// Why the value could not be serialized
        message: String,
    },

    /// A snapshot file was written with a different format version
    #[error("Snapshot format version mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(strata::snapshot::version_mismatch))]
    VersionMismatch {
        /// Version this build reads and writes
        expected: u32,
        /// Version found in the file
        found: u32,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an I/O error without path context
    #[must_use]
    pub fn io_no_path(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: None,
            operation: operation.into(),
        }
    }

    /// Create a malformed data error
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed {
            message: msg.into(),
        }
    }

    /// Create an error naming the property whose value could not be stored
    #[must_use]
    pub fn property_not_serializable(
        property: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PropertyNotSerializable {
            property: property.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the encoded data itself is unusable
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::UnknownSnapshotTag { .. } | Self::Malformed { .. } | Self::VersionMismatch { .. }
        )
    }
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, Error>;
