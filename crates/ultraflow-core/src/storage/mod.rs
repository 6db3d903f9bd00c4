mod config;
pub mod database;
mod sessions;
mod settings;

pub use config::{Config, IdentityConfig, SyncConfig, TimerConfig};
pub use database::Database;
pub use sessions::{SessionStore, SESSIONS_KEY};
pub use settings::{SettingsStore, SETTINGS_KEY};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{ConfigError, StorageError};

/// Returns `~/.config/ultraflow[-dev]/` based on ULTRAFLOW_ENV.
///
/// Set ULTRAFLOW_ENV=dev to use the development data directory, or
/// ULTRAFLOW_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ULTRAFLOW_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ULTRAFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ultraflow-dev")
            } else {
                base_dir.join("ultraflow")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Durable key -> JSON document persistence.
pub trait DocumentStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following read fail with [`StorageError::Unavailable`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every following write fail with [`StorageError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("read of '{key}' refused")));
        }
        let docs = self
            .docs
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        Ok(docs.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("write to '{key}' refused")));
        }
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        docs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.read("k").unwrap().is_none());
        store.write("k", "[]").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn memory_store_write_failure() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.write("k", "v"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.read("k").unwrap().is_none());
    }

    #[test]
    fn memory_store_read_failure() {
        let store = MemoryStore::new();
        store.write("k", "v").unwrap();
        store.set_fail_reads(true);
        assert!(matches!(store.read("k"), Err(StorageError::Unavailable(_))));
        store.set_fail_reads(false);
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
    }
}
