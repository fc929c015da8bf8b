//! Key-value persistence boundary.
//!
//! The session persists exactly two logical records — `settings` and
//! `conversations` — through this trait. [`FileStore`] keeps them as JSON
//! files under the platform data directory; [`MemoryStore`] backs tests and
//! the degraded in-memory-only mode used when disk persistence fails.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Result, SamvadError};

/// Synchronous key-value storage for persisted session state.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw serialized record, `None` when absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a record.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a record if present.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` file per record.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at an explicit directory (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory for this application.
    pub fn new_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "samvad").ok_or_else(|| {
            SamvadError::Storage("could not determine platform data directory".into())
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and degraded sessions.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a record, e.g. to simulate previously persisted state.
    pub fn with_record(self, key: &str, value: &str) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.records.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Record key for persisted settings.
pub const SETTINGS_KEY: &str = "settings";
/// Record key for persisted conversations.
pub const CONVERSATIONS_KEY: &str = "conversations";
