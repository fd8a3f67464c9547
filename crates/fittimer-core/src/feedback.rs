//! Haptic/audio cue requests.
//!
//! The engine never talks to hardware. It emits events; the runner turns the
//! cue-bearing ones into fire-and-forget [`Feedback::cue`] calls. Whatever a
//! backend does when vibration is unavailable (beep, nothing) stays inside
//! the backend.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::storage::FeedbackConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Final seconds of an interval.
    Warning,
    /// An interval finished.
    Success,
}

impl Cue {
    /// Vibration pattern in milliseconds, alternating on/off.
    pub fn pattern(self) -> &'static [u64] {
        match self {
            Cue::Warning => &[50],
            Cue::Success => &[50, 50, 50, 50, 50],
        }
    }
}

/// Receiver of cue requests. Implementations must not panic.
pub trait Feedback: Send + Sync {
    fn cue(&self, cue: Cue);
}

/// Drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl Feedback for NoopFeedback {
    fn cue(&self, _cue: Cue) {}
}

/// Output a backend uses for a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Vibration,
    /// Beep fallback.
    Sound,
}

/// Writes cues to the trace log. Handy for headless hosts.
#[derive(Debug, Clone)]
pub struct LogFeedback {
    settings: FeedbackConfig,
}

impl LogFeedback {
    pub fn new(settings: FeedbackConfig) -> Self {
        Self { settings }
    }

    /// Where a cue goes under the current settings: vibration when allowed,
    /// otherwise a beep, otherwise nowhere.
    pub fn channel(&self) -> Option<Channel> {
        let settings = &self.settings;
        match (settings.enabled, settings.vibration, settings.sound) {
            (false, _, _) => None,
            (true, true, _) => Some(Channel::Vibration),
            (true, false, true) => Some(Channel::Sound),
            (true, false, false) => None,
        }
    }
}

impl Default for LogFeedback {
    fn default() -> Self {
        Self::new(FeedbackConfig::default())
    }
}

impl Feedback for LogFeedback {
    fn cue(&self, cue: Cue) {
        match self.channel() {
            Some(Channel::Vibration) => {
                tracing::debug!(?cue, pattern = ?cue.pattern(), "Vibrate");
            }
            Some(Channel::Sound) => tracing::debug!(?cue, "Beep"),
            None => {}
        }
    }
}

/// Remembers every cue it receives.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    cues: Mutex<Vec<Cue>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.cues().iter().filter(|c| **c == cue).count()
    }
}

impl Feedback for RecordingFeedback {
    fn cue(&self, cue: Cue) {
        self.cues.lock().unwrap_or_else(PoisonError::into_inner).push(cue);
    }
}
