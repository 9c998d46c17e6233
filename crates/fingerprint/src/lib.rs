//! Deterministic content fingerprints for incremental builds
//!
//! This crate answers "did this input change?" for file-based inputs:
//! - [`HashAccumulator`] / [`ContentDigest`]: incremental 128-bit hashing
//! - [`ContentHasher`]: pluggable policy for folding content into a hash
//! - [`EntryFingerprinter`]: per-entry digests for plain files and zip archives
//!
//! # Determinism
//!
//! Fingerprints must be byte-identical across machines and runs. Archive
//! members are visited in sorted name order and directory trees are walked
//! in sorted order, so filesystem and container enumeration order never
//! leaks into a digest.

// TODO(fingerprint-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

pub mod digest;
pub mod entry;
mod error;
pub mod fingerprinter;
pub mod hasher;

pub use digest::{ContentDigest, DIGEST_LEN, HashAccumulator};
pub use entry::{EntryDetails, FileKind};
pub use error::{Error, Result};
pub use fingerprinter::{DEFAULT_ARCHIVE_SUFFIXES, DEFAULT_IDENTITY, EntryFingerprinter};
pub use hasher::{ContentHasher, ExcludingContentHasher, RawContentHasher};
