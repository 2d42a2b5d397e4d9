//! Key/value storage for values that outlive a single run, such as the session identity.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage file error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Storage file is not a valid JSON object: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Plain string storage with no expiry, modelled after the browser's `localStorage`.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Values are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a single JSON object file. The whole file is rewritten on every write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the storage file at `path`. A missing file is an empty storage.
    #[instrument]
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let items = if path.exists() {
            let content = fs::read_to_string(path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        debug!(entries = items.len(), "Opened storage");

        Ok(Self {
            path: path.to_path_buf(),
            items: Mutex::new(items),
        })
    }

    /// Opens `session.json` in the given data directory.
    pub fn in_dir(data_dir: &Path) -> Result<Self, StorageError> {
        Self::open(&data_dir.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        // Memory only changes once the file holds the new value
        let mut updated = items.clone();
        updated.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&updated)?;
        fs::write(&self.path, content)?;
        *items = updated;
        debug!(key, path = %self.path.display(), "Persisted storage item");
        Ok(())
    }
}
