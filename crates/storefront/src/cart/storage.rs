//! Persistence adapters for client-side state.
//!
//! The store persists through this narrow interface so tests can substitute
//! an in-memory adapter. All operations are synchronous and best-effort:
//! persistence failing (directory missing, disk full, storage disabled)
//! degrades to memory-only operation and never surfaces to the user.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

/// Storage key for the persisted cart document.
pub const CART_KEY: &str = "cart";

/// Storage key for the order-edit session handoff.
pub const EDIT_SESSION_KEY: &str = "order-edit";

/// Narrow key/value persistence interface.
pub trait StorageAdapter {
    /// Read a value, if present.
    fn load(&self, key: &str) -> Option<String>;

    /// Write a value. Best-effort; failures are logged, not returned.
    fn store(&self, key: &str, value: &str);

    /// Delete a value. Best-effort.
    fn remove(&self, key: &str);
}

/// In-memory adapter for tests and storage-disabled operation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// File-backed adapter: one JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file-backed store rooted at `dir`.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal constants, but sanitize anyway so a key can
        // never escape the storage directory.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl StorageAdapter for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn store(&self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "Failed to create storage directory");
            return;
        }
        if let Err(e) = std::fs::write(self.path_for(key), value) {
            warn!(key, error = %e, "Failed to persist state");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if path.exists()
            && let Err(e) = std::fs::remove_file(&path)
        {
            warn!(key, error = %e, "Failed to remove persisted state");
        }
    }
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for std::sync::Arc<T> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) {
        (**self).store(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// No-op adapter for environments where persistence is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStorage;

impl StorageAdapter for NoStorage {
    fn load(&self, _key: &str) -> Option<String> {
        None
    }

    fn store(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}
