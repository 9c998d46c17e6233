//! Error types for the cache crate
//!
//! Every backend reports failures through this one [`Error`] type, so callers
//! never need to know which backend produced a failure to handle it.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Boxed cause carried by [`Error::Backend`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error during cache operations
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(strata::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create")
        operation: String,
    },

    /// Backend-specific failure (network, permissions, remote protocol)
    #[error("{backend} failed: {message}")]
    #[diagnostic(
        code(strata::cache::backend),
        help("The build can continue without this cache; check the backend's availability")
    )]
    Backend {
        /// Description of the failing backend
        backend: String,
        /// What went wrong
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<BoxError>,
    },

    /// Failure of a load or store, attributed to the entry's key
    #[error("Failed to {operation} cache entry {key}")]
    #[diagnostic(code(strata::cache::entry))]
    Entry {
        /// "load" or "store"
        operation: &'static str,
        /// Key of the entry being transferred
        key: String,
        /// The failure reported by the backend
        #[source]
        source: Box<Error>,
    },

    /// Configuration or validation error
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(strata::cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Operation attempted after the backend was closed
    #[error("{backend} is closed")]
    #[diagnostic(code(strata::cache::closed))]
    Closed {
        /// Description of the closed backend
        backend: String,
    },

    /// Several independent failures, e.g. from closing more than one backend
    #[error("{} failures while {operation}", errors.len())]
    #[diagnostic(code(strata::cache::composite))]
    Composite {
        /// What was being attempted
        operation: String,
        /// Every failure, in the order they occurred
        #[related]
        errors: Vec<Error>,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

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

    /// Wrap a backend-specific cause
    #[must_use]
    pub fn backend(backend: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        Self::Backend {
            backend: backend.into(),
            message: cause.to_string(),
            source: Some(cause),
        }
    }

    /// Create a backend failure with no underlying cause
    #[must_use]
    pub fn backend_message(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attribute this failure to the entry `key`.
    ///
    /// An error that already names a key is returned unchanged.
    #[must_use]
    pub fn for_entry(self, operation: &'static str, key: impl Into<String>) -> Self {
        match self {
            Self::Entry { .. } => self,
            other => Self::Entry {
                operation,
                key: key.into(),
                source: Box::new(other),
            },
        }
    }

    /// The failure underneath any key attribution
    #[must_use]
    pub fn without_entry(&self) -> &Self {
        match self {
            Self::Entry { source, .. } => source.without_entry(),
            other => other,
        }
    }

    /// Create a closed-backend error
    #[must_use]
    pub fn closed(backend: impl Into<String>) -> Self {
        Self::Closed {
            backend: backend.into(),
        }
    }

    /// Collapse a list of failures: none is `Ok`, one is returned as is,
    /// several become [`Error::Composite`]
    pub fn aggregate(operation: impl Into<String>, mut errors: Vec<Self>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Composite {
                operation: operation.into(),
                errors,
            }),
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
