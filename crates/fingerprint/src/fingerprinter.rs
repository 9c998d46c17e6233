//! Content fingerprints for classpath-style entries
//!
//! A plain file is fingerprinted from its bytes. A file whose name carries an
//! archive suffix is opened as a zip container and fingerprinted from its
//! members, visited in sorted name order so the result does not depend on the
//! order of the container's central directory.
//!
//! Every accumulator is seeded with a signature derived from the
//! fingerprinter's identity string. Changing the identity changes every
//! digest, which invalidates fingerprints recorded by an older algorithm.

use crate::digest::{ContentDigest, HashAccumulator};
use crate::entry::{EntryDetails, FileKind};
use crate::hasher::ContentHasher;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::result::ZipError;

/// Identity string baked into every fingerprint. Bump the suffix whenever the
/// hashing scheme changes.
pub const DEFAULT_IDENTITY: &str = "strata_fingerprint::EntryFingerprinter/1";

/// File name suffixes treated as zip containers, compared case-insensitively
pub const DEFAULT_ARCHIVE_SUFFIXES: &[&str] = &[".jar", ".zip"];

/// Computes one [`ContentDigest`] per filesystem entry.
///
/// Holds only configuration, so a single instance can be shared across
/// threads.
#[derive(Clone)]
pub struct EntryFingerprinter {
    signature: ContentDigest,
    hasher: Arc<dyn ContentHasher>,
    archive_suffixes: Vec<String>,
}

impl EntryFingerprinter {
    /// Create a fingerprinter with the default identity and archive suffixes
    pub fn new(hasher: impl ContentHasher + 'static) -> Self {
        Self {
            signature: HashAccumulator::digest_of(DEFAULT_IDENTITY.as_bytes()),
            hasher: Arc::new(hasher),
            archive_suffixes: DEFAULT_ARCHIVE_SUFFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Replace the identity string the signature is derived from
    #[must_use]
    pub fn with_signature(mut self, identity: &str) -> Self {
        self.signature = HashAccumulator::digest_of(identity.as_bytes());
        self
    }

    /// Replace the recognised archive suffixes
    #[must_use]
    pub fn with_archive_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.archive_suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// The signature prefix fed into every accumulator
    #[must_use]
    pub fn signature(&self) -> ContentDigest {
        self.signature
    }

    /// Whether `name` follows an archive naming convention
    #[must_use]
    pub fn is_archive(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.archive_suffixes.iter().any(|s| lower.ends_with(s))
    }

    /// Fingerprint a single entry.
    ///
    /// Returns `Ok(None)` for directories, missing entries, and entries whose
    /// content the [`ContentHasher`] declined entirely. Read failures are
    /// errors, never `None`.
    pub fn fingerprint(&self, entry: &EntryDetails) -> Result<Option<ContentDigest>> {
        match entry.kind {
            FileKind::Directory | FileKind::Missing => {
                tracing::debug!(
                    path = %entry.path.display(),
                    kind = ?entry.kind,
                    "No fingerprint for non-file entry"
                );
                return Ok(None);
            }
            FileKind::RegularFile => {}
        }

        let mut hasher = self.new_accumulator();
        let contributed = if self.is_archive(&entry.name) {
            self.hash_archive(entry, &mut hasher)?
        } else {
            self.hash_file(entry, &mut hasher)?
        };

        if contributed {
            Ok(Some(hasher.finish()))
        } else {
            tracing::debug!(
                path = %entry.path.display(),
                "Content hasher declined entry, no fingerprint"
            );
            Ok(None)
        }
    }

    /// Inspect `path` on disk and fingerprint it
    pub fn fingerprint_path(&self, path: impl Into<PathBuf>) -> Result<Option<ContentDigest>> {
        let entry = EntryDetails::inspect(path)?;
        self.fingerprint(&entry)
    }

    /// Fingerprint a classpath, keeping only the entries that produced a digest
    pub fn fingerprint_all<'a, I>(&self, entries: I) -> Result<BTreeMap<PathBuf, ContentDigest>>
    where
        I: IntoIterator<Item = &'a EntryDetails>,
    {
        let mut fingerprints = BTreeMap::new();
        for entry in entries {
            if let Some(digest) = self.fingerprint(entry)? {
                fingerprints.insert(entry.path.clone(), digest);
            }
        }
        Ok(fingerprints)
    }

    /// Fingerprint every file at or beneath `root`.
    ///
    /// Traversal is sorted by file name. A missing root yields an empty map.
    pub fn fingerprint_tree(&self, root: &Path) -> Result<BTreeMap<PathBuf, ContentDigest>> {
        let mut fingerprints = BTreeMap::new();
        if EntryDetails::inspect(root)?.kind == FileKind::Missing {
            return Ok(fingerprints);
        }

        for dir_entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let dir_entry = dir_entry.map_err(walk_error)?;
            if dir_entry.file_type().is_dir() {
                continue;
            }
            let entry = EntryDetails::inspect(dir_entry.path())?;
            if let Some(digest) = self.fingerprint(&entry)? {
                fingerprints.insert(entry.path, digest);
            }
        }
        Ok(fingerprints)
    }

    fn new_accumulator(&self) -> HashAccumulator {
        let mut hasher = HashAccumulator::new();
        hasher.put_digest(&self.signature);
        hasher
    }

    fn hash_file(&self, entry: &EntryDetails, hasher: &mut HashAccumulator) -> Result<bool> {
        let content = std::fs::read(&entry.path).map_err(|e| Error::io(e, &entry.path, "read"))?;
        Ok(self.hasher.update_file_hash(entry, hasher, &content))
    }

    fn hash_archive(&self, entry: &EntryDetails, hasher: &mut HashAccumulator) -> Result<bool> {
        let path = entry.path.as_path();
        let file = File::open(path).map_err(|e| Error::io(e, path, "open archive"))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| archive_error(path, e))?;

        // Central directory order is not stable across tools; visit by name.
        // A duplicated name keeps its last occurrence.
        let mut members = BTreeMap::new();
        for index in 0..archive.len() {
            let member = archive
                .by_index_raw(index)
                .map_err(|e| archive_error(path, e))?;
            if !member.is_dir() {
                members.insert(member.name().to_string(), index);
            }
        }

        let mut contributed = false;
        let mut content = Vec::new();
        for (name, index) in &members {
            let mut member = archive
                .by_index(*index)
                .map_err(|e| archive_error(path, e))?;
            content.clear();
            member
                .read_to_end(&mut content)
                .map_err(|e| Error::io(e, path, format!("read archive member {name}")))?;
            tracing::trace!(
                archive = %path.display(),
                member = %name,
                size = content.len(),
                "Hashing archive member"
            );
            contributed |= self
                .hasher
                .update_member_hash(path, name, hasher, &content);
        }
        Ok(contributed)
    }
}

impl fmt::Debug for EntryFingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFingerprinter")
            .field("signature", &self.signature)
            .field("archive_suffixes", &self.archive_suffixes)
            .finish_non_exhaustive()
    }
}

fn archive_error(path: &Path, err: ZipError) -> Error {
    match err {
        ZipError::Io(source) => Error::io(source, path, "read archive"),
        other => Error::archive(path, other.to_string()),
    }
}

fn walk_error(err: walkdir::Error) -> Error {
    let path = err.path().map(Path::to_path_buf);
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    match path {
        Some(p) => Error::io(source, p, "walk"),
        None => Error::io_no_path(source, "walk"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{ExcludingContentHasher, RawContentHasher};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_jar(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    fn fingerprinter() -> EntryFingerprinter {
        EntryFingerprinter::new(RawContentHasher)
    }

    #[test]
    fn test_directory_and_missing_have_no_fingerprint() {
        let tmp = TempDir::new().unwrap();
        let fp = fingerprinter();

        assert!(fp.fingerprint_path(tmp.path()).unwrap().is_none());
        assert!(fp.fingerprint_path(tmp.path().join("gone")).unwrap().is_none());
    }

    #[test]
    fn test_plain_file_is_signature_then_content() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        std::fs::write(&file, b"hello").unwrap();
        let fp = fingerprinter();

        let mut expected = HashAccumulator::new();
        expected.put_digest(&fp.signature());
        expected.put_bytes(b"hello");

        assert_eq!(fp.fingerprint_path(&file).unwrap(), Some(expected.finish()));
    }

    #[test]
    fn test_archive_member_order_does_not_matter() {
        let tmp = TempDir::new().unwrap();
        let forward = tmp.path().join("forward.jar");
        let backward = tmp.path().join("backward.jar");
        write_jar(&forward, &[("A.class", b"aaa"), ("Z.class", b"zzz")]);
        write_jar(&backward, &[("Z.class", b"zzz"), ("A.class", b"aaa")]);
        let fp = fingerprinter();

        let a = fp.fingerprint_path(&forward).unwrap();
        let b = fp.fingerprint_path(&backward).unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_archive_content_change_changes_digest() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("lib.jar");
        let fp = fingerprinter();

        write_jar(&jar, &[("A.class", b"v1")]);
        let before = fp.fingerprint_path(&jar).unwrap();
        write_jar(&jar, &[("A.class", b"v2")]);
        let after = fp.fingerprint_path(&jar).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_archive_member_rename_changes_digest() {
        let tmp = TempDir::new().unwrap();
        let foo = tmp.path().join("foo.jar");
        let bar = tmp.path().join("bar.jar");
        write_jar(&foo, &[("Foo.class", b"bytecode")]);
        write_jar(&bar, &[("Bar.class", b"bytecode")]);
        let fp = fingerprinter();

        assert_ne!(
            fp.fingerprint_path(&foo).unwrap(),
            fp.fingerprint_path(&bar).unwrap()
        );
    }

    #[test]
    fn test_archive_member_split_changes_digest() {
        let tmp = TempDir::new().unwrap();
        let whole = tmp.path().join("whole.jar");
        let split = tmp.path().join("split.jar");
        write_jar(&whole, &[("A.class", b"bytecode")]);
        write_jar(&split, &[("A.class", b"byte"), ("B.class", b"code")]);
        let fp = fingerprinter();

        let split_digest = fp.fingerprint_path(&split).unwrap();
        assert_ne!(fp.fingerprint_path(&whole).unwrap(), split_digest);

        // same bytes, boundary moved between the same two members
        let shifted = tmp.path().join("shifted.jar");
        write_jar(&shifted, &[("A.class", b"byt"), ("B.class", b"ecode")]);
        assert_ne!(fp.fingerprint_path(&shifted).unwrap(), split_digest);
    }

    #[test]
    fn test_archive_suffix_is_case_insensitive() {
        let fp = fingerprinter();
        assert!(fp.is_archive("LIB.JAR"));
        assert!(fp.is_archive("bundle.zip"));
        assert!(!fp.is_archive("notes.txt"));

        let custom = fingerprinter().with_archive_suffixes([".AAR"]);
        assert!(custom.is_archive("ui.aar"));
        assert!(!custom.is_archive("lib.jar"));
    }

    #[test]
    fn test_signature_changes_every_digest() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        let jar = tmp.path().join("lib.jar");
        std::fs::write(&file, b"same").unwrap();
        write_jar(&jar, &[("A.class", b"same")]);

        let v1 = fingerprinter();
        let v2 = fingerprinter().with_signature("strata_fingerprint::EntryFingerprinter/2");

        assert_ne!(
            v1.fingerprint_path(&file).unwrap(),
            v2.fingerprint_path(&file).unwrap()
        );
        assert_ne!(
            v1.fingerprint_path(&jar).unwrap(),
            v2.fingerprint_path(&jar).unwrap()
        );
    }

    #[test]
    fn test_rejected_file_differs_from_empty_file() {
        let tmp = TempDir::new().unwrap();
        let rejected = tmp.path().join("skip.log");
        let empty = tmp.path().join("empty.txt");
        std::fs::write(&rejected, b"").unwrap();
        std::fs::write(&empty, b"").unwrap();

        let fp = EntryFingerprinter::new(
            ExcludingContentHasher::new(RawContentHasher, ["*.log"]).unwrap(),
        );

        assert_eq!(fp.fingerprint_path(&rejected).unwrap(), None);
        assert!(fp.fingerprint_path(&empty).unwrap().is_some());
    }

    #[test]
    fn test_archive_with_only_rejected_members_has_no_fingerprint() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("meta.jar");
        write_jar(&jar, &[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0")]);

        let fp = EntryFingerprinter::new(
            ExcludingContentHasher::new(RawContentHasher, ["META-INF/*"]).unwrap(),
        );
        assert_eq!(fp.fingerprint_path(&jar).unwrap(), None);
    }

    #[test]
    fn test_excluded_member_does_not_affect_digest() {
        let tmp = TempDir::new().unwrap();
        let plain = tmp.path().join("plain.jar");
        let stamped = tmp.path().join("stamped.jar");
        write_jar(&plain, &[("A.class", b"aaa")]);
        write_jar(
            &stamped,
            &[("A.class", b"aaa"), ("META-INF/MANIFEST.MF", b"Built-At: now")],
        );

        let fp = EntryFingerprinter::new(
            ExcludingContentHasher::new(RawContentHasher, ["META-INF/*"]).unwrap(),
        );
        assert_eq!(
            fp.fingerprint_path(&plain).unwrap(),
            fp.fingerprint_path(&stamped).unwrap()
        );
    }

    #[test]
    fn test_malformed_archive_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("broken.jar");
        std::fs::write(&jar, b"definitely not a zip").unwrap();

        let err = fingerprinter().fingerprint_path(&jar).unwrap_err();
        assert!(matches!(err, Error::Archive { .. }), "got {err:?}");
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let fp = fingerprinter();
        let entry = EntryDetails::new("/definitely/not/here.txt", FileKind::RegularFile);

        let err = fp.fingerprint(&entry).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_fingerprint_tree_skips_directories() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("classes/com")).unwrap();
        std::fs::write(tmp.path().join("classes/com/A.class"), b"a").unwrap();
        std::fs::write(tmp.path().join("b.txt"), b"b").unwrap();

        let tree = fingerprinter().fingerprint_tree(tmp.path()).unwrap();
        let paths: Vec<_> = tree.keys().cloned().collect();
        assert_eq!(
            paths,
            vec![
                tmp.path().join("b.txt"),
                tmp.path().join("classes/com/A.class"),
            ]
        );
    }

    #[test]
    fn test_fingerprint_tree_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let tree = fingerprinter()
            .fingerprint_tree(&tmp.path().join("absent"))
            .unwrap();
        assert!(tree.is_empty());
    }
}
