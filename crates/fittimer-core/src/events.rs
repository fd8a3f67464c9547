use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feedback::Cue;
use crate::timer::Phase;
use crate::workout::{WorkoutMode, WorkoutSession};

/// Every state change in the engine produces an Event.
/// The UI renders from them; the runner maps some of them to feedback cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkoutStarted {
        session_id: String,
        mode: WorkoutMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    WorkoutPaused {
        time_remaining: u64,
        at: DateTime<Utc>,
    },
    WorkoutResumed {
        time_remaining: u64,
        at: DateTime<Utc>,
    },
    /// Final seconds of an interval.
    CountdownWarning {
        time_remaining: u64,
        at: DateTime<Utc>,
    },
    /// The countdown hit zero; an advance is pending.
    IntervalCompleted {
        session_id: String,
        phase: Phase,
        at: DateTime<Utc>,
    },
    /// Moved to the next exercise (or the next drop) inside a cycle.
    ExerciseAdvanced {
        exercise_index: usize,
        drop: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    RestStarted {
        cycle: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    RestEnded {
        skipped: bool,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    WorkoutEnded {
        session_id: String,
        cycles_completed: u32,
        total_time: u64,
        at: DateTime<Utc>,
    },
    WorkoutReset {
        at: DateTime<Utc>,
    },
    /// An in-flight session was picked up again after a restart.
    WorkoutRestored {
        session_id: String,
        time_remaining: u64,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        active: bool,
        is_paused: bool,
        phase: Phase,
        exercise_index: usize,
        exercise_name: String,
        drop: u32,
        cycle: u32,
        time_remaining: u64,
        total_time: u64,
        interval_progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Summary of a finalized session. Sessions that were never finished
    /// are stamped with their start time.
    pub fn workout_ended(session: &WorkoutSession) -> Event {
        Event::WorkoutEnded {
            session_id: session.id.clone(),
            cycles_completed: session.cycles_completed,
            total_time: session.total_time,
            at: session.end_time.unwrap_or(session.start_time),
        }
    }

    /// The feedback cue this event should trigger, if any.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Event::CountdownWarning { .. } => Some(Cue::Warning),
            Event::IntervalCompleted { .. } => Some(Cue::Success),
            _ => None,
        }
    }
}
