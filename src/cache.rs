//! Local durable cache.
//!
//! A key-value store with a single string value per key, used to persist the
//! JSON snapshot of the task collection under a fixed versioned key. It is
//! read once at startup and rewritten after every mutation; it is a downstream
//! mirror of the in-memory collection, never a source of truth mid-session.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Local key-value cache boundary.
pub trait LocalCache {
    /// Best-effort read; any failure is reported as absence.
    fn read(&self, key: &str) -> Option<String>;

    /// Persist a value under a key.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed cache: one file per key under a directory.
///
/// Writes go through a temp file in the same directory followed by a rename,
/// so a crash never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl LocalCache for FileCache {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-memory cache for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn read(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
