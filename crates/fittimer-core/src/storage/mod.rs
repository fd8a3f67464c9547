mod bridge;
mod config;
pub mod database;

pub use bridge::{PersistenceBridge, Restored};
pub use config::{Config, FeedbackConfig, HistoryConfig, TimerConfig};
pub use database::SqliteStore;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;

/// Names of the aggregates written by the persistence bridge.
pub mod aggregate {
    pub const HISTORY: &str = "history";
    pub const TEMPLATES: &str = "templates";
    pub const CONFIG: &str = "config";
    pub const ACTIVE_SESSION: &str = "active_session";
}

/// Durable key-value store of whole aggregates.
///
/// Every save replaces the aggregate wholesale; there are no cross-aggregate
/// transactions.
pub trait AggregateStore: Send {
    fn load_aggregate(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn save_aggregate(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    fn delete_aggregate(&self, name: &str) -> Result<(), StorageError>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    aggregates: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aggregates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

impl AggregateStore for MemoryStore {
    fn load_aggregate(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let aggregates = self.aggregates.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(aggregates.get(name).cloned())
    }

    fn save_aggregate(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut aggregates = self.aggregates.lock().unwrap_or_else(PoisonError::into_inner);
        aggregates.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete_aggregate(&self, name: &str) -> Result<(), StorageError> {
        let mut aggregates = self.aggregates.lock().unwrap_or_else(PoisonError::into_inner);
        aggregates.remove(name);
        Ok(())
    }
}

impl<S: AggregateStore + Sync> AggregateStore for std::sync::Arc<S> {
    fn load_aggregate(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load_aggregate(name)
    }

    fn save_aggregate(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).save_aggregate(name, bytes)
    }

    fn delete_aggregate(&self, name: &str) -> Result<(), StorageError> {
        (**self).delete_aggregate(name)
    }
}

/// Returns `~/.config/fittimer[-dev]/` based on FITTIMER_ENV.
///
/// Set FITTIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FITTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("fittimer-dev")
    } else {
        base_dir.join("fittimer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load_aggregate(aggregate::HISTORY).unwrap().is_none());
        store.save_aggregate(aggregate::HISTORY, b"[]").unwrap();
        assert_eq!(store.load_aggregate(aggregate::HISTORY).unwrap().unwrap(), b"[]");
        store.delete_aggregate(aggregate::HISTORY).unwrap();
        assert!(!store.contains(aggregate::HISTORY));
        // Deleting twice is fine.
        store.delete_aggregate(aggregate::HISTORY).unwrap();
    }
}
