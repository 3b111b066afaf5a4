//! Local key-value storage for bell state that must survive restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use cff_core::utils::fs::{is_not_found, read_to_string, write_string_atomically};
use cff_core::utils::paths::get_app_data_dir;
use tracing::debug;

use crate::error::{NotificationError, NotificationResult};

/// String-keyed, string-valued persistent store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> NotificationResult<Option<String>>;
    /// Overwrites the value of `key`.
    fn set(&self, key: &str, value: &str) -> NotificationResult<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A store rooted at `<XDG data>/cff-admin/store`.
    pub fn in_app_data_dir() -> NotificationResult<Self> {
        let base = get_app_data_dir().map_err(|e| {
            NotificationError::persistence("resolve_dir", "Application data directory unavailable", e)
        })?;
        Ok(Self::new(base.join("store")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> NotificationResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(NotificationError::persistence_error_no_source(
                "resolve_key",
                format!("Invalid storage key '{}'", key),
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> NotificationResult<Option<String>> {
        let path = self.path_for(key)?;
        match read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if is_not_found(&e) => {
                debug!(path = %path.display(), "No stored value for key '{}'", key);
                Ok(None)
            }
            Err(e) => Err(NotificationError::persistence(
                "get",
                format!("Failed to read key '{}'", key),
                e,
            )),
        }
    }

    fn set(&self, key: &str, value: &str) -> NotificationResult<()> {
        let path = self.path_for(key)?;
        write_string_atomically(&path, value).map_err(|e| {
            NotificationError::persistence("set", format!("Failed to write key '{}'", key), e)
        })
    }
}

/// In-process store; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.into(), value.into());
        }
        store
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> NotificationResult<Option<String>> {
        let entries = self.entries.read().map_err(|e| {
            NotificationError::Internal(format!("Failed to acquire read lock for store entries: {}", e))
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> NotificationResult<()> {
        let mut entries = self.entries.write().map_err(|e| {
            NotificationError::Internal(format!("Failed to acquire write lock for store entries: {}", e))
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> NotificationResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> NotificationResult<()> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> NotificationResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> NotificationResult<()> {
        (**self).set(key, value)
    }
}
