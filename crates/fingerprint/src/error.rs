//! Error types for the fingerprint crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for fingerprinting operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading an entry or one of its archive members
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(strata::fingerprint::io),
        help("Check that the input exists and is readable")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "open archive")
        operation: String,
    },

    /// The entry looked like an archive but could not be parsed as one
    #[error("Malformed archive {}: {message}", path.display())]
    #[diagnostic(
        code(strata::fingerprint::archive),
        help("The file has an archive suffix but is not a valid zip container")
    )]
    Archive {
        /// Path of the archive
        path: Box<Path>,
        /// Description of the format problem
        message: String,
    },

    /// Invalid exclusion pattern or digest literal
    #[error("Fingerprint configuration error: {message}")]
    #[diagnostic(code(strata::fingerprint::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
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

    /// Create a malformed archive error
    #[must_use]
    pub fn archive(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.as_ref().into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }
}

/// Result type for fingerprinting operations
pub type Result<T> = std::result::Result<T, Error>;
