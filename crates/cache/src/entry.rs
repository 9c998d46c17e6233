//! Streaming producers and consumers of cache entry payloads

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Produces an artifact by streaming it into a sink.
///
/// A writer may be invoked more than once by a backend that retries, but the
/// dispatcher never invokes a caller's writer more than once per store.
pub trait EntryWriter {
    /// Stream the artifact into `output`
    fn write_to(&self, output: &mut dyn Write) -> io::Result<()>;
}

/// Consumes an artifact streamed out of a backend
pub trait EntryReader {
    /// Consume the artifact from `input`
    fn read_from(&mut self, input: &mut dyn Read) -> io::Result<()>;
}

impl<F> EntryWriter for F
where
    F: Fn(&mut dyn Write) -> io::Result<()>,
{
    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        self(output)
    }
}

impl<F> EntryReader for F
where
    F: FnMut(&mut dyn Read) -> io::Result<()>,
{
    fn read_from(&mut self, input: &mut dyn Read) -> io::Result<()> {
        self(input)
    }
}

/// Replays a file's contents; safe to invoke any number of times
#[derive(Debug, Clone)]
pub struct FileEntryWriter {
    path: PathBuf,
}

impl FileEntryWriter {
    /// Replay the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The replayed file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryWriter for FileEntryWriter {
    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut input = BufReader::new(File::open(&self.path)?);
        io::copy(&mut input, output)?;
        Ok(())
    }
}
