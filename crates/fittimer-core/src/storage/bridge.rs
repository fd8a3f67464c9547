//! Serialization between in-memory state and the aggregate store.
//!
//! Aggregates are JSON documents. Reads never fail the caller: missing data
//! yields defaults and malformed data is logged and dropped.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{aggregate, AggregateStore};
use crate::error::Result;
use crate::history::{History, DEFAULT_HISTORY_LIMIT};
use crate::templates::{TemplateStore, WorkoutTemplate};
use crate::timer::{ActiveSessionSnapshot, WorkoutEngine};
use crate::workout::{WorkoutConfig, WorkoutSession};

/// Everything read back at startup.
#[derive(Debug, Default)]
pub struct Restored {
    pub history: History,
    pub templates: TemplateStore,
    pub config: Option<WorkoutConfig>,
    /// In-flight session as it was saved. Elapsed time is charged when the
    /// engine restores it.
    pub active: Option<ActiveSessionSnapshot>,
}

pub struct PersistenceBridge<S> {
    store: S,
    history_limit: usize,
}

impl<S: AggregateStore> PersistenceBridge<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Read every aggregate, falling back to empty state where needed.
    pub fn restore(&self) -> Restored {
        let sessions: Vec<WorkoutSession> = self.read(aggregate::HISTORY).unwrap_or_default();
        let templates: Vec<WorkoutTemplate> = self.read(aggregate::TEMPLATES).unwrap_or_default();
        let restored = Restored {
            history: History::from_sessions(sessions, self.history_limit),
            templates: TemplateStore::from_templates(templates),
            config: self.read(aggregate::CONFIG),
            active: self.read(aggregate::ACTIVE_SESSION),
        };
        tracing::info!(
            history = restored.history.len(),
            templates = restored.templates.len(),
            active = restored.active.is_some(),
            "Restored persisted state"
        );
        restored
    }

    pub fn persist_history(&self, history: &History) -> Result<()> {
        self.write(aggregate::HISTORY, &history.sessions())
    }

    pub fn persist_templates(&self, templates: &TemplateStore) -> Result<()> {
        self.write(aggregate::TEMPLATES, templates.all())
    }

    pub fn persist_config(&self, config: Option<&WorkoutConfig>) -> Result<()> {
        match config {
            Some(config) => self.write(aggregate::CONFIG, config),
            None => Ok(self.store.delete_aggregate(aggregate::CONFIG)?),
        }
    }

    /// Save the in-flight session, or remove a stale snapshot when idle.
    pub fn persist_active(&self, engine: &WorkoutEngine, now: DateTime<Utc>) -> Result<()> {
        match engine.capture(now) {
            Some(snapshot) => self.write(aggregate::ACTIVE_SESSION, &snapshot),
            None => Ok(self.store.delete_aggregate(aggregate::ACTIVE_SESSION)?),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.save_aggregate(name, &bytes)?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let bytes = match self.store.load_aggregate(name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(aggregate = name, error = %e, "Failed to read aggregate");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(aggregate = name, error = %e, "Discarding malformed aggregate");
                None
            }
        }
    }
}
