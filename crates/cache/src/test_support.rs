//! In-memory backend used by unit tests

use crate::backend::CacheBackend;
use crate::entry::{EntryReader, EntryWriter};
use crate::key::CacheKey;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Backend holding entries in a map, with switchable failures and call
/// counters
#[derive(Debug, Default)]
pub struct MemoryBackend {
    name: String,
    entries: Mutex<HashMap<CacheKey, Vec<u8>>>,
    pub loads: AtomicUsize,
    pub stores: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_load: bool,
    pub fail_store: bool,
    pub fail_close: bool,
}

impl MemoryBackend {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail_load: true,
            fail_store: true,
            fail_close: true,
            ..Self::named(name)
        }
    }

    pub fn insert(&self, key: &CacheKey, bytes: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), bytes.to_vec());
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl CacheBackend for MemoryBackend {
    fn load(&self, key: &CacheKey, reader: &mut dyn EntryReader) -> Result<bool> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(Error::backend_message(&self.name, "load refused"));
        }
        let Some(bytes) = self.get(key) else {
            return Ok(false);
        };
        reader
            .read_from(&mut bytes.as_slice())
            .map_err(|e| Error::backend(&self.name, e))?;
        Ok(true)
    }

    fn store(&self, key: &CacheKey, writer: &dyn EntryWriter) -> Result<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.fail_store {
            return Err(Error::backend_message(&self.name, "store refused"));
        }
        let mut bytes = Vec::new();
        writer
            .write_to(&mut bytes)
            .map_err(|e| Error::backend(&self.name, e))?;
        self.insert(key, &bytes);
        Ok(())
    }

    fn description(&self) -> String {
        self.name.clone()
    }

    fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(Error::backend_message(&self.name, "close refused"));
        }
        Ok(())
    }
}
