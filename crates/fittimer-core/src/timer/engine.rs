//! Workout session state machine.
//!
//! The engine owns the active [`TimerState`] and [`WorkoutSession`]. It has no
//! thread and no clock of its own: the caller feeds it elapsed seconds through
//! `tick()` and passes the wall-clock time into every transition.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running(exercising) <-> Paused
//! Running(exercising) -> Running(resting) -> Running(exercising)
//! Running | Paused -> Idle            (end / reset)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = WorkoutEngine::new();
//! engine.set_config(config);
//! engine.start(clock.now());
//! // Whenever the ticker reports elapsed seconds:
//! if let Some(Event::IntervalCompleted { session_id, .. }) = engine.tick(secs, clock.now()) {
//!     // ~500ms later:
//!     engine.finish_interval(&session_id, clock.now());
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::workout::{Exercise, WorkoutConfig, WorkoutMode, WorkoutSession};

/// Seconds before the end of an interval during which warning cues fire.
pub const DEFAULT_WARNING_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Exercising,
    Resting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    pub is_running: bool,
    pub is_paused: bool,
    pub is_resting: bool,
    /// Index into the config's exercises. Always 0 for drop sets.
    pub current_exercise_index: usize,
    /// Completed cycles.
    pub current_cycle: u32,
    /// Drop within the current cycle (drop sets only).
    pub current_drop: u32,
    /// Seconds left in the current interval.
    pub time_remaining: u64,
    /// Reserved, never advanced.
    pub total_cycles: u32,
}

impl TimerState {
    fn running(time_remaining: u64) -> Self {
        Self {
            is_running: true,
            time_remaining,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_resting {
            Phase::Resting
        } else {
            Phase::Exercising
        }
    }
}

/// Persisted image of an in-flight workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSessionSnapshot {
    pub timer: TimerState,
    pub session: WorkoutSession,
    pub saved_at: DateTime<Utc>,
}

impl ActiveSessionSnapshot {
    /// Whether the timer values fit the session's config.
    pub fn is_consistent(&self) -> bool {
        let config = &self.session.config;
        let timer = &self.timer;
        if !timer.is_running || self.session.is_finished() || config.exercises.is_empty() {
            return false;
        }
        if timer.time_remaining > config.longest_interval() {
            return false;
        }
        match config.mode {
            WorkoutMode::DropSet => timer.current_drop < config.drops(),
            _ => timer.current_exercise_index < config.exercises.len(),
        }
    }
}

/// Core workout state machine.
#[derive(Debug, Clone)]
pub struct WorkoutEngine {
    config: Option<WorkoutConfig>,
    state: TimerState,
    session: Option<WorkoutSession>,
    /// Set when the countdown reached zero and the advance is still pending.
    awaiting_advance: bool,
    warning_secs: u64,
}

impl Default for WorkoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkoutEngine {
    pub fn new() -> Self {
        Self {
            config: None,
            state: TimerState::default(),
            session: None,
            awaiting_advance: false,
            warning_secs: DEFAULT_WARNING_SECS,
        }
    }

    pub fn with_warning_secs(mut self, secs: u64) -> Self {
        self.warning_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> Option<&WorkoutConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn session(&self) -> Option<&WorkoutSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_awaiting_advance(&self) -> bool {
        self.awaiting_advance
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Config of the running session, falling back to the pending one.
    fn active_config(&self) -> Option<&WorkoutConfig> {
        self.session
            .as_ref()
            .map(|s| &s.config)
            .or(self.config.as_ref())
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        let config = self.active_config()?;
        match config.mode {
            WorkoutMode::DropSet => config.exercises.first(),
            _ => config.exercises.get(self.state.current_exercise_index),
        }
    }

    /// The exercise that follows the current one, wrapping at the end of
    /// the cycle.
    pub fn upcoming_exercise(&self) -> Option<&Exercise> {
        let config = self.active_config()?;
        if config.exercises.is_empty() {
            return None;
        }
        match config.mode {
            WorkoutMode::DropSet => config.exercises.first(),
            _ => {
                let next = (self.state.current_exercise_index + 1) % config.exercises.len();
                config.exercises.get(next)
            }
        }
    }

    /// Full length of the current interval in seconds.
    pub fn interval_total(&self) -> u64 {
        match self.active_config() {
            Some(c) if self.state.is_resting => c.rest_time,
            Some(c) => c.exercise_time,
            None => 0,
        }
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn interval_progress(&self) -> f64 {
        let total = self.interval_total();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.time_remaining as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            active: self.is_active(),
            is_paused: self.state.is_paused,
            phase: self.phase(),
            exercise_index: self.state.current_exercise_index,
            exercise_name: self
                .current_exercise()
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            drop: self.state.current_drop,
            cycle: self.state.current_cycle,
            time_remaining: self.state.time_remaining,
            total_time: self.interval_total(),
            interval_progress: self.interval_progress(),
            at: now,
        }
    }

    /// Image of the in-flight session for persistence, if any.
    pub fn capture(&self, now: DateTime<Utc>) -> Option<ActiveSessionSnapshot> {
        let session = self.session.as_ref()?;
        Some(ActiveSessionSnapshot {
            timer: self.state,
            session: session.clone(),
            saved_at: now,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the pending config. Refused while a session is active.
    pub fn set_config(&mut self, config: WorkoutConfig) -> bool {
        if self.is_active() {
            tracing::debug!("Config change refused: workout in progress");
            return false;
        }
        self.config = Some(config.named());
        true
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.is_active() {
            return None;
        }
        let config = self.config.as_ref()?;
        if !config.has_named_exercise() {
            tracing::debug!("Start refused: no named exercises");
            return None;
        }

        let session = WorkoutSession::begin(config.clone(), now);
        let event = Event::WorkoutStarted {
            session_id: session.id.clone(),
            mode: config.mode,
            duration_secs: config.exercise_time,
            at: now,
        };
        tracing::info!(
            session_id = %session.id,
            mode = %config.mode,
            exercises = config.exercises.len(),
            "Workout started"
        );
        self.state = TimerState::running(config.exercise_time);
        self.session = Some(session);
        self.awaiting_advance = false;
        Some(event)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_active() || self.state.is_paused {
            return None;
        }
        self.state.is_paused = true;
        Some(Event::WorkoutPaused {
            time_remaining: self.state.time_remaining,
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_active() || !self.state.is_paused {
            return None;
        }
        self.state.is_paused = false;
        Some(Event::WorkoutResumed {
            time_remaining: self.state.time_remaining,
            at: now,
        })
    }

    /// Apply `elapsed` seconds to the countdown in one step.
    ///
    /// Returns `IntervalCompleted` when the countdown reaches zero and
    /// `CountdownWarning` while it sits in the final seconds. Ticks are
    /// ignored while paused, while idle, and while an advance is pending.
    pub fn tick(&mut self, elapsed: u64, now: DateTime<Utc>) -> Option<Event> {
        let counting = self.state.is_running && !self.state.is_paused;
        if !self.is_active() || !counting || self.awaiting_advance {
            return None;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(elapsed);
        let remaining = self.state.time_remaining;

        if remaining == 0 {
            self.awaiting_advance = true;
            let session_id = self.session.as_ref()?.id.clone();
            return Some(Event::IntervalCompleted {
                session_id,
                phase: self.phase(),
                at: now,
            });
        }
        if remaining <= self.warning_secs {
            return Some(Event::CountdownWarning {
                time_remaining: remaining,
                at: now,
            });
        }
        None
    }

    /// Perform the advance left pending by `tick`. Calls for a session that
    /// is no longer active, or when nothing is pending, do nothing.
    pub fn finish_interval(&mut self, session_id: &str, now: DateTime<Utc>) -> Option<Event> {
        if !self.awaiting_advance {
            return None;
        }
        if self.session.as_ref().map(|s| s.id.as_str()) != Some(session_id) {
            return None;
        }
        self.advance(now)
    }

    /// Move to the next interval according to the mode's rule.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let session = self.session.as_ref()?;
        let config = &session.config;
        let (mode, count, drops) = (config.mode, config.exercises.len(), config.drops());
        let (exercise_time, rest_time) = (config.exercise_time, config.rest_time);
        self.awaiting_advance = false;

        if self.state.is_resting {
            return Some(self.leave_rest(exercise_time, false, now));
        }

        let event = match mode {
            WorkoutMode::DropSet => {
                let next_drop = self.state.current_drop + 1;
                if next_drop < drops {
                    self.state.current_drop = next_drop;
                    self.state.time_remaining = exercise_time;
                    Event::ExerciseAdvanced {
                        exercise_index: 0,
                        drop: next_drop,
                        duration_secs: exercise_time,
                        at: now,
                    }
                } else {
                    self.begin_rest(rest_time, now)
                }
            }
            WorkoutMode::PairedSet | WorkoutMode::TripleSet | WorkoutMode::GiantSet => {
                let next_index = self.state.current_exercise_index + 1;
                if next_index < count {
                    self.state.current_exercise_index = next_index;
                    self.state.time_remaining = exercise_time;
                    Event::ExerciseAdvanced {
                        exercise_index: next_index,
                        drop: 0,
                        duration_secs: exercise_time,
                        at: now,
                    }
                } else {
                    self.begin_rest(rest_time, now)
                }
            }
        };
        tracing::debug!(
            cycle = self.state.current_cycle,
            exercise = self.state.current_exercise_index,
            drop = self.state.current_drop,
            resting = self.state.is_resting,
            "Advanced"
        );
        Some(event)
    }

    /// Leave the rest phase right away. No-op unless resting.
    pub fn skip_rest(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.state.is_resting {
            return None;
        }
        let exercise_time = self.session.as_ref()?.config.exercise_time;
        self.awaiting_advance = false;
        Some(self.leave_rest(exercise_time, true, now))
    }

    /// Finalize the active session and return it for the history ledger.
    pub fn end(&mut self, now: DateTime<Utc>) -> Option<WorkoutSession> {
        let session = self.session.take()?;
        let finished = session.finish(self.state.current_cycle, now);
        tracing::info!(
            session_id = %finished.id,
            cycles = finished.cycles_completed,
            total_secs = finished.total_time,
            "Workout ended"
        );
        self.state = TimerState::default();
        self.awaiting_advance = false;
        Some(finished)
    }

    /// Discard the active session without recording it.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        if let Some(session) = self.session.take() {
            tracing::info!(session_id = %session.id, "Workout discarded");
        }
        self.state = TimerState::default();
        self.awaiting_advance = false;
        Event::WorkoutReset { at: now }
    }

    /// Resume a persisted session, charging the time that passed since it
    /// was saved. Paused snapshots keep their remaining time.
    pub fn restore(
        &mut self,
        snapshot: ActiveSessionSnapshot,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        if self.is_active() {
            return None;
        }
        if !snapshot.is_consistent() {
            tracing::warn!(
                session_id = %snapshot.session.id,
                "Discarding inconsistent session snapshot"
            );
            return None;
        }

        let elapsed_secs = if snapshot.timer.is_paused {
            0
        } else {
            (now - snapshot.saved_at).num_seconds().max(0) as u64
        };
        let mut state = snapshot.timer;
        state.time_remaining = state.time_remaining.saturating_sub(elapsed_secs);

        let event = Event::WorkoutRestored {
            session_id: snapshot.session.id.clone(),
            time_remaining: state.time_remaining,
            elapsed_secs,
            at: now,
        };
        tracing::info!(
            session_id = %snapshot.session.id,
            elapsed_secs,
            time_remaining = state.time_remaining,
            "Workout restored"
        );
        self.config = Some(snapshot.session.config.clone());
        self.session = Some(snapshot.session);
        self.state = state;
        self.awaiting_advance = false;
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin_rest(&mut self, rest_time: u64, now: DateTime<Utc>) -> Event {
        self.state.is_resting = true;
        self.state.current_exercise_index = 0;
        self.state.current_drop = 0;
        self.state.current_cycle += 1;
        self.state.time_remaining = rest_time;
        Event::RestStarted {
            cycle: self.state.current_cycle,
            duration_secs: rest_time,
            at: now,
        }
    }

    fn leave_rest(&mut self, exercise_time: u64, skipped: bool, now: DateTime<Utc>) -> Event {
        self.state.is_resting = false;
        self.state.current_exercise_index = 0;
        self.state.current_drop = 0;
        self.state.time_remaining = exercise_time;
        Event::RestEnded {
            skipped,
            duration_secs: exercise_time,
            at: now,
        }
    }
}
