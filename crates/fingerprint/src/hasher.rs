//! Pluggable content hashing
//!
//! A [`ContentHasher`] decides whether a unit of content (a plain file or a
//! single archive member) contributes to a fingerprint, and how it is folded
//! into the in-progress [`HashAccumulator`].

use crate::digest::HashAccumulator;
use crate::entry::EntryDetails;
use crate::{Error, Result};
use glob::Pattern;
use std::path::Path;
use std::sync::Arc;

/// Folds content into an accumulator, or declines it.
///
/// Returning `false` means the content was excluded. A plain file whose
/// content is excluded produces no fingerprint at all, which is different
/// from a fingerprint over zero bytes.
pub trait ContentHasher: Send + Sync {
    /// Hash the full content of a plain file
    fn update_file_hash(
        &self,
        entry: &EntryDetails,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool;

    /// Hash one decompressed archive member
    fn update_member_hash(
        &self,
        archive: &Path,
        member: &str,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool;
}

impl<H: ContentHasher + ?Sized> ContentHasher for Arc<H> {
    fn update_file_hash(
        &self,
        entry: &EntryDetails,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool {
        (**self).update_file_hash(entry, hasher, content)
    }

    fn update_member_hash(
        &self,
        archive: &Path,
        member: &str,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool {
        (**self).update_member_hash(archive, member, hasher, content)
    }
}

/// Feeds every byte of every unit; never declines.
///
/// Archive members are fed as their name, their length, then their content,
/// so renaming a member or moving bytes between members changes the digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawContentHasher;

impl ContentHasher for RawContentHasher {
    fn update_file_hash(
        &self,
        _entry: &EntryDetails,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool {
        hasher.put_bytes(content);
        true
    }

    fn update_member_hash(
        &self,
        _archive: &Path,
        member: &str,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool {
        hasher.put_str(member);
        hasher.put_u64(content.len() as u64);
        hasher.put_bytes(content);
        true
    }
}

/// Declines files and members whose name matches an exclusion glob,
/// delegating everything else to an inner hasher.
///
/// Plain files are matched on their logical name, archive members on their
/// full member path (e.g. `META-INF/MANIFEST.MF`).
#[derive(Debug, Clone)]
pub struct ExcludingContentHasher<H> {
    inner: H,
    excludes: Vec<Pattern>,
}

impl<H: ContentHasher> ExcludingContentHasher<H> {
    /// Wrap `inner`, excluding anything matching one of `patterns`
    pub fn new<I, S>(inner: H, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excludes = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| {
                    Error::configuration(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { inner, excludes })
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(name))
    }
}

impl<H: ContentHasher> ContentHasher for ExcludingContentHasher<H> {
    fn update_file_hash(
        &self,
        entry: &EntryDetails,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool {
        if self.is_excluded(&entry.name) {
            tracing::trace!(name = %entry.name, "File excluded from fingerprint");
            return false;
        }
        self.inner.update_file_hash(entry, hasher, content)
    }

    fn update_member_hash(
        &self,
        archive: &Path,
        member: &str,
        hasher: &mut HashAccumulator,
        content: &[u8],
    ) -> bool {
        if self.is_excluded(member) {
            tracing::trace!(
                archive = %archive.display(),
                member,
                "Archive member excluded from fingerprint"
            );
            return false;
        }
        self.inner.update_member_hash(archive, member, hasher, content)
    }
}
