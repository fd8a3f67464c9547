//! Bounded, most-recent-first log of finished workouts.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::workout::WorkoutSession;

/// Default number of sessions kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_sessions: usize,
    pub total_cycles: u64,
    pub total_time_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    sessions: VecDeque<WorkoutSession>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            sessions: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Rebuild from a persisted most-recent-first list.
    pub fn from_sessions(sessions: Vec<WorkoutSession>, limit: usize) -> Self {
        let mut history = Self::with_limit(limit);
        history.sessions = sessions.into();
        history.sessions.truncate(history.limit);
        history
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a finished session, dropping the oldest past the limit.
    pub fn append(&mut self, session: WorkoutSession) {
        self.sessions.push_front(session);
        self.sessions.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn get(&self, id: &str) -> Option<&WorkoutSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkoutSession> {
        self.sessions.iter()
    }

    /// Snapshot of every entry, most recent first.
    pub fn sessions(&self) -> Vec<WorkoutSession> {
        self.sessions.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn summary(&self) -> HistorySummary {
        self.sessions.iter().fold(HistorySummary::default(), |mut acc, s| {
            acc.total_sessions += 1;
            acc.total_cycles += u64::from(s.cycles_completed);
            acc.total_time_secs += s.total_time;
            acc
        })
    }
}

/// Render seconds as `"{m}m {s}s"`.
pub fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{WorkoutConfig, WorkoutMode};
    use chrono::{Duration, Utc};

    fn session(n: i64) -> WorkoutSession {
        let start = Utc::now() + Duration::minutes(n);
        let config = WorkoutConfig::with_names(WorkoutMode::PairedSet, ["a", "b"], 40, 60);
        WorkoutSession::begin(config, start).finish(n as u32, start + Duration::seconds(90))
    }

    #[test]
    fn keeps_most_recent_hundred() {
        let mut history = History::new();
        let mut ids = Vec::new();
        for n in 0..101 {
            let s = session(n);
            ids.push(s.id.clone());
            history.append(s);
        }
        assert_eq!(history.len(), 100);
        let sessions = history.sessions();
        assert_eq!(sessions[0].id, ids[100]);
        assert_eq!(sessions[99].id, ids[1]);
        assert!(history.get(&ids[0]).is_none());
    }

    #[test]
    fn clear_empties_history() {
        let mut history = History::new();
        history.append(session(1));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn summary_totals_sessions() {
        let mut history = History::new();
        history.append(session(2));
        history.append(session(3));
        let summary = history.summary();
        assert_eq!(summary.total_sessions, 2);
        assert_eq!(summary.total_cycles, 5);
        assert_eq!(summary.total_time_secs, 180);
    }

    #[test]
    fn from_sessions_applies_limit() {
        let sessions = (0..5).map(session).collect();
        let history = History::from_sessions(sessions, 3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn format_duration_splits_minutes() {
        assert_eq!(format_duration(0), "0m 0s");
        assert_eq!(format_duration(125), "2m 5s");
    }
}
