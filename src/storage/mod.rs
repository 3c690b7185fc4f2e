//! Durable key/value storage (the extension's `localStorage`).

mod json_file;
mod migrations;
mod sqlite;

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use json_file::JsonFileStorage;
pub use sqlite::SqliteStorage;

pub const API_KEY: &str = "yt-learner-api-key";
pub const FOCUS_MODE_KEY: &str = "yt-learner-focus-mode";
pub const NOTES_KEY: &str = "youtube-learner-notes";

pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-lifetime storage. Used in tests and as the fallback when nothing
/// durable can be opened.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum StorageBackend {
    Memory,
    #[default]
    JsonFile,
    Sqlite,
}

impl StorageBackend {
    fn file_name(&self) -> Option<&'static str> {
        match self {
            StorageBackend::Memory => None,
            StorageBackend::JsonFile => Some("storage.json"),
            StorageBackend::Sqlite => Some("storage.sqlite3"),
        }
    }
}

/// Open the configured backend under `data_dir`. Any failure degrades to
/// in-memory storage for the session.
pub fn open_storage(backend: StorageBackend, data_dir: &Path) -> Arc<dyn DurableStorage> {
    let opened: Result<Arc<dyn DurableStorage>> = match backend.file_name() {
        None => Ok(Arc::new(MemoryStorage::new())),
        Some(file_name) => {
            let path = data_dir.join(file_name);
            match backend {
                StorageBackend::Sqlite => {
                    SqliteStorage::open(path).map(|s| Arc::new(s) as Arc<dyn DurableStorage>)
                }
                _ => JsonFileStorage::open(path).map(|s| Arc::new(s) as Arc<dyn DurableStorage>),
            }
        }
    };

    match opened {
        Ok(storage) => storage,
        Err(err) => {
            log::warn!("durable storage unavailable ({err:#}); keeping state in memory only");
            Arc::new(MemoryStorage::new())
        }
    }
}
