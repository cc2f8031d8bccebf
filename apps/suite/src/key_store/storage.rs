//! Persistent key-value storage backing the key store.
//!
//! The store only ever touches one fixed key, but the backend is a plain
//! string map so the file format stays readable and extensible.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace storage file: {0}")]
    Persist(std::io::Error),

    #[error("Storage unavailable")]
    Unavailable,
}

/// Put/get/delete by string key. Implementations must be usable from any thread.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// File-backed storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    entries: BTreeMap<String, StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    updated_at: DateTime<Utc>,
}

/// JSON file on disk. Every write replaces the file atomically through a
/// temp file in the same directory, so a crash never leaves a torn file.
/// Temp files are created owner-only (0600 on unix) and keep that mode.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_file(&self) -> Result<StorageFile, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(StorageFile::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StorageFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, file: &StorageFile) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, file)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::Persist(e.error))?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_file()?.entries.remove(key).map(|e| e.value))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut file = self.read_file()?;
        file.entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
        self.write_file(&file)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut file = self.read_file()?;
        if file.entries.remove(key).is_some() {
            self.write_file(&file)?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory storage
// ────────────────────────────────────────────────────────────────────────────

/// Process-local map. Used in tests and when no storage path is usable.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.remove(key);
        Ok(())
    }
}
