//! Application state container.
//!
//! `TimerService` owns the engine, the history ledger, the template store and
//! the persistence bridge. The host builds one and passes it around; there is
//! no global instance. Every mutation is followed by a write of the aggregate
//! it touched. Write failures are logged and otherwise ignored so that a
//! broken disk never interrupts a workout.

use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::history::{History, HistorySummary};
use crate::storage::{AggregateStore, Config, PersistenceBridge};
use crate::templates::{TemplatePatch, TemplateQuery, TemplateStore, WorkoutTemplate};
use crate::timer::{Clock, SystemClock, TimerState, WorkoutEngine};
use crate::workout::{WorkoutConfig, WorkoutSession};

pub struct TimerService<S> {
    engine: WorkoutEngine,
    history: History,
    templates: TemplateStore,
    bridge: PersistenceBridge<S>,
    clock: Arc<dyn Clock>,
}

impl<S: AggregateStore> TimerService<S> {
    /// Restore persisted state from `store` and resume any in-flight
    /// session, charging the time that passed while the process was down.
    pub fn open(store: S, settings: &Config, clock: Arc<dyn Clock>) -> Self {
        let bridge = PersistenceBridge::new(store).with_history_limit(settings.history.max_entries);
        let restored = bridge.restore();

        let mut engine = WorkoutEngine::new().with_warning_secs(settings.timer.warning_secs);
        if let Some(config) = restored.config {
            engine.set_config(config);
        }
        if let Some(snapshot) = restored.active {
            engine.restore(snapshot, clock.now());
        }

        let service = Self {
            engine,
            history: restored.history,
            templates: restored.templates,
            bridge,
            clock,
        };
        // Drop a snapshot that could not be resumed, or re-stamp the one that was.
        service.save_active();
        service
    }

    /// Open with default settings on the system clock.
    pub fn with_defaults(store: S) -> Self {
        Self::open(store, &Config::default(), Arc::new(SystemClock))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &WorkoutEngine {
        &self.engine
    }

    pub fn state(&self) -> &TimerState {
        self.engine.state()
    }

    pub fn config(&self) -> Option<&WorkoutConfig> {
        self.engine.config()
    }

    pub fn session(&self) -> Option<&WorkoutSession> {
        self.engine.session()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(self.clock.now())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_summary(&self) -> HistorySummary {
        self.history.summary()
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn favorites(&self) -> Vec<&WorkoutTemplate> {
        self.templates.favorites()
    }

    pub fn query_templates(&self, query: &TemplateQuery) -> Vec<&WorkoutTemplate> {
        self.templates.query(query)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn store(&self) -> &S {
        self.bridge.store()
    }

    // ── Workout control ──────────────────────────────────────────────

    pub fn set_config(&mut self, config: WorkoutConfig) -> bool {
        if !self.engine.set_config(config) {
            return false;
        }
        self.save_config();
        true
    }

    pub fn start(&mut self) -> Option<Event> {
        let event = self.engine.start(self.clock.now())?;
        self.save_active();
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.engine.pause(self.clock.now())?;
        self.save_active();
        Some(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let event = self.engine.resume(self.clock.now())?;
        self.save_active();
        Some(event)
    }

    pub fn tick(&mut self, elapsed: u64) -> Option<Event> {
        let before = *self.engine.state();
        let event = self.engine.tick(elapsed, self.clock.now());
        if *self.engine.state() != before {
            self.save_active();
        }
        event
    }

    pub fn finish_interval(&mut self, session_id: &str) -> Option<Event> {
        let event = self.engine.finish_interval(session_id, self.clock.now())?;
        self.save_active();
        Some(event)
    }

    /// Jump to the next exercise, drop or phase right away.
    pub fn next(&mut self) -> Option<Event> {
        let event = self.engine.advance(self.clock.now())?;
        self.save_active();
        Some(event)
    }

    pub fn skip_rest(&mut self) -> Option<Event> {
        let event = self.engine.skip_rest(self.clock.now())?;
        self.save_active();
        Some(event)
    }

    /// Finish the workout and record it in the history.
    pub fn end(&mut self) -> Option<WorkoutSession> {
        let session = self.engine.end(self.clock.now())?;
        self.history.append(session.clone());
        self.save_history();
        self.save_active();
        Some(session)
    }

    /// Abandon the workout without recording it.
    pub fn reset(&mut self) -> Event {
        let event = self.engine.reset(self.clock.now());
        self.save_active();
        event
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.save_history();
    }

    // ── Templates ────────────────────────────────────────────────────

    pub fn save_template(
        &mut self,
        name: &str,
        description: &str,
        config: WorkoutConfig,
    ) -> Result<WorkoutTemplate, ValidationError> {
        let template = self.templates.save(name, description, config, self.clock.now())?;
        self.save_templates();
        Ok(template)
    }

    pub fn template_from_history(
        &mut self,
        session_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<WorkoutTemplate>, ValidationError> {
        let now = self.clock.now();
        let template = self
            .templates
            .create_from_history(&self.history, session_id, name, description, now)?;
        if template.is_some() {
            self.save_templates();
        }
        Ok(template)
    }

    /// Make a template's config the pending workout config.
    ///
    /// Refused while a workout is running, in which case the template's
    /// usage count is left alone.
    pub fn load_template(&mut self, id: &str) -> Option<WorkoutConfig> {
        if self.engine.is_active() {
            tracing::debug!(template_id = %id, "Template load refused: workout in progress");
            return None;
        }
        let config = self.templates.load(id, self.clock.now())?;
        self.engine.set_config(config.clone());
        self.save_templates();
        self.save_config();
        Some(config)
    }

    pub fn update_template(&mut self, id: &str, patch: TemplatePatch) -> bool {
        let updated = self.templates.update(id, patch, self.clock.now());
        if updated {
            self.save_templates();
        }
        updated
    }

    pub fn replace_template_config(&mut self, id: &str, config: WorkoutConfig) -> bool {
        let replaced = self.templates.replace_config(id, config, self.clock.now());
        if replaced {
            self.save_templates();
        }
        replaced
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let favorite = self.templates.toggle_favorite(id, self.clock.now())?;
        self.save_templates();
        Some(favorite)
    }

    pub fn duplicate_template(&mut self, id: &str) -> Option<WorkoutTemplate> {
        let copy = self.templates.duplicate(id, self.clock.now())?;
        self.save_templates();
        Some(copy)
    }

    pub fn delete_template(&mut self, id: &str) -> bool {
        let deleted = self.templates.delete(id);
        if deleted {
            self.save_templates();
        }
        deleted
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn save_active(&self) {
        let result = self.bridge.persist_active(&self.engine, self.clock.now());
        log_write("active_session", result);
    }

    fn save_history(&self) {
        log_write("history", self.bridge.persist_history(&self.history));
    }

    fn save_templates(&self) {
        log_write("templates", self.bridge.persist_templates(&self.templates));
    }

    fn save_config(&self) {
        log_write("config", self.bridge.persist_config(self.engine.config()));
    }
}

fn log_write(aggregate: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!(aggregate, error = %e, "Failed to persist aggregate");
    }
}
