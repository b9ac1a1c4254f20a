use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::now_millis;
use crate::error::{Error, Result};

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Entry {
    value: Value,
    /// Epoch milliseconds after which the entry is gone.
    expiry: i64,
}

/// Key/value store whose entries expire, optionally persisted as one JSON file.
#[derive(Debug)]
pub struct ExpiringStore {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ExpiringStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Opens (or starts) a store backed by `path`. An unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt cache file {:?}: {}", path, e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    pub fn set_with_expiry<T: Serialize>(&self, key: &str, value: &T, expiry: i64) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| Error::Invalid(format!("cache value: {}", e)))?;
        let mut entries = self.lock();
        entries.insert(key.to_string(), Entry { value, expiry });
        self.persist(&entries)
    }

    pub fn get_with_expiry<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with_expiry_at(key, now_millis())
    }

    /// Reads `key` as of `now`, evicting it when expired or unreadable.
    pub fn get_with_expiry_at<T: DeserializeOwned>(&self, key: &str, now: i64) -> Option<T> {
        let mut entries = self.lock();
        let entry = entries.get(key)?.clone();
        if now > entry.expiry {
            debug!(key, "cache entry expired");
            entries.remove(key);
            self.persist_or_warn(key, &entries);
            return None;
        }
        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "dropping unreadable cache entry: {}", e);
                entries.remove(key);
                self.persist_or_warn(key, &entries);
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Eviction on read has no caller to report to.
    fn persist_or_warn(&self, key: &str, entries: &HashMap<String, Entry>) {
        if let Err(e) = self.persist(entries) {
            warn!(key, "Could not write cache file after eviction: {}", e);
        }
    }

    fn persist(&self, entries: &HashMap<String, Entry>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string(entries)
            .map_err(|e| Error::Invalid(format!("cache file: {}", e)))?;
        fs::write(path, raw)?;
        Ok(())
    }
}
