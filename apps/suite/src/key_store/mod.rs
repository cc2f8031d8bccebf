//! Key Store: the single source of truth for the Gemini credential.
//!
//! Resolution order at startup: build-time key → persisted key → none.
//! Nothing else in the service reads or writes the persisted key.

pub mod storage;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Fixed storage key for the persisted credential.
pub const STORAGE_KEY: &str = "gemini_api_key";

/// Where the current credential came from. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    Build,
    Browser,
    None,
}

/// Outcome of [`KeyStore::require`].
///
/// `Ready` hands the action back together with the credential so the caller
/// can proceed immediately. `Prompt` hands the action back untouched; the
/// caller holds it as the pending continuation until a key is supplied.
#[derive(Debug, PartialEq)]
pub enum KeyGate<A> {
    Ready { action: A, credential: String },
    Prompt(A),
}

pub struct KeyStore {
    storage: Box<dyn KeyValueStorage>,
    current: Option<String>,
    source: KeySource,
}

impl KeyStore {
    pub fn resolve(build_key: Option<&str>, storage: Box<dyn KeyValueStorage>) -> Self {
        if let Some(key) = non_empty(build_key) {
            info!("Using build-time API key");
            return Self {
                storage,
                current: Some(key),
                source: KeySource::Build,
            };
        }

        let persisted = match storage.get(STORAGE_KEY) {
            Ok(value) => non_empty(value.as_deref()),
            Err(e) => {
                warn!("Could not read stored API key: {e}");
                None
            }
        };

        let source = if persisted.is_some() {
            info!("Using stored API key");
            KeySource::Browser
        } else {
            info!("No API key configured");
            KeySource::None
        };

        Self {
            storage,
            current: persisted,
            source,
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Stores a trimmed key. Returns `false` (and changes nothing) when the
    /// trimmed value is empty. A storage failure is logged and swallowed;
    /// the key stays usable for the rest of the process.
    pub fn set(&mut self, value: &str) -> bool {
        let Some(key) = non_empty(Some(value)) else {
            debug!("Ignoring empty API key");
            return false;
        };

        if let Err(e) = self.storage.put(STORAGE_KEY, &key) {
            warn!("Could not persist API key, keeping it in memory only: {e}");
        }
        self.current = Some(key);
        self.source = KeySource::Browser;
        true
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.storage.delete(STORAGE_KEY) {
            warn!("Could not remove stored API key: {e}");
        }
        self.current = None;
        self.source = KeySource::None;
    }

    pub fn has(&self) -> bool {
        self.current.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn require<A>(&self, action: A) -> KeyGate<A> {
        match self.current.as_deref() {
            Some(key) if !key.is_empty() => KeyGate::Ready {
                action,
                credential: key.to_string(),
            },
            _ => KeyGate::Prompt(action),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
