//! Workout data model: modes, exercises, configurations and sessions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Drop count used when a drop-set config carries none.
pub const DEFAULT_DROPS_PER_EXERCISE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutMode {
    /// Two exercises back to back.
    PairedSet,
    /// Three exercises in sequence.
    TripleSet,
    /// One exercise repeated with decreasing load.
    DropSet,
    /// Up to eight exercises in a row.
    GiantSet,
}

impl WorkoutMode {
    pub const ALL: [WorkoutMode; 4] = [
        WorkoutMode::PairedSet,
        WorkoutMode::TripleSet,
        WorkoutMode::DropSet,
        WorkoutMode::GiantSet,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkoutMode::PairedSet => "Paired set",
            WorkoutMode::TripleSet => "Triple set",
            WorkoutMode::DropSet => "Drop set",
            WorkoutMode::GiantSet => "Giant set",
        }
    }

    /// Maximum number of exercises the authoring layer may hand over.
    pub fn max_exercises(self) -> usize {
        match self {
            WorkoutMode::PairedSet => 2,
            WorkoutMode::TripleSet => 3,
            WorkoutMode::DropSet => 1,
            WorkoutMode::GiantSet => 8,
        }
    }

    pub fn uses_drops(self) -> bool {
        self == WorkoutMode::DropSet
    }
}

impl fmt::Display for WorkoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Parameters of one workout. Treated as immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    pub mode: WorkoutMode,
    pub exercises: Vec<Exercise>,
    /// Seconds per exercise interval.
    pub exercise_time: u64,
    /// Seconds of rest after each cycle.
    pub rest_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drops_per_exercise: Option<u32>,
}

impl WorkoutConfig {
    pub fn new(
        mode: WorkoutMode,
        exercises: Vec<Exercise>,
        exercise_time: u64,
        rest_time: u64,
    ) -> Self {
        let drops_per_exercise = mode.uses_drops().then_some(DEFAULT_DROPS_PER_EXERCISE);
        Self {
            mode,
            exercises,
            exercise_time,
            rest_time,
            drops_per_exercise,
        }
    }

    /// Convenience constructor from bare exercise names.
    pub fn with_names<I, S>(mode: WorkoutMode, names: I, exercise_time: u64, rest_time: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let exercises = names.into_iter().map(Exercise::new).collect();
        Self::new(mode, exercises, exercise_time, rest_time)
    }

    pub fn with_drops(mut self, drops: u32) -> Self {
        self.drops_per_exercise = Some(drops);
        self
    }

    /// Copy of this config with unnamed exercises removed.
    pub fn named(&self) -> Self {
        let mut config = self.clone();
        config.exercises.retain(Exercise::is_named);
        config
    }

    pub fn has_named_exercise(&self) -> bool {
        self.exercises.iter().any(Exercise::is_named)
    }

    /// Drops per cycle, falling back to the default for configs that omit it.
    pub fn drops(&self) -> u32 {
        self.drops_per_exercise
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DROPS_PER_EXERCISE)
    }

    /// Upper bound for `time_remaining` while this config is active.
    pub fn longest_interval(&self) -> u64 {
        self.exercise_time.max(self.rest_time)
    }

    /// Check the contract the authoring layer promises before handing a
    /// config over.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named = self.exercises.iter().filter(|e| e.is_named()).count();
        if named == 0 {
            return Err(ValidationError::NoExercises);
        }
        let max = self.mode.max_exercises();
        if named > max {
            return Err(ValidationError::TooManyExercises {
                mode: self.mode,
                max,
                len: named,
            });
        }
        if self.exercise_time == 0 {
            return Err(ValidationError::InvalidValue {
                field: "exercise_time".into(),
                message: "must be positive".into(),
            });
        }
        match (self.mode.uses_drops(), self.drops_per_exercise) {
            (true, None) | (true, Some(0)) => Err(ValidationError::InvalidValue {
                field: "drops_per_exercise".into(),
                message: "drop sets need at least one drop".into(),
            }),
            (false, Some(_)) => Err(ValidationError::InvalidValue {
                field: "drops_per_exercise".into(),
                message: format!("not used by {}", self.mode),
            }),
            _ => Ok(()),
        }
    }
}

/// One workout attempt. Finalized exactly once when the workout ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub config: WorkoutConfig,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub cycles_completed: u32,
    /// Wall-clock length of the session in seconds.
    pub total_time: u64,
}

impl WorkoutSession {
    pub fn begin(config: WorkoutConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            start_time: now,
            end_time: None,
            cycles_completed: 0,
            total_time: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Consume the open session and stamp its final figures.
    pub fn finish(self, cycles_completed: u32, now: DateTime<Utc>) -> Self {
        let total_time = (now - self.start_time).num_seconds().max(0) as u64;
        Self {
            end_time: Some(now),
            cycles_completed,
            total_time,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn named_drops_blank_exercises() {
        let names = ["Squat", " ", "", "Lunge"];
        let config = WorkoutConfig::with_names(WorkoutMode::GiantSet, names, 40, 60);
        let named = config.named();
        assert_eq!(named.exercises.len(), 2);
        assert_eq!(named.exercises[1].name, "Lunge");
    }

    #[test]
    fn validate_rejects_unnamed_config() {
        let config = WorkoutConfig::with_names(WorkoutMode::PairedSet, ["", "  "], 40, 60);
        assert_eq!(config.validate(), Err(ValidationError::NoExercises));
    }

    #[test]
    fn validate_enforces_mode_limits() {
        let names = ["a", "b", "c", "d"];
        let config = WorkoutConfig::with_names(WorkoutMode::TripleSet, names, 40, 60);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::TooManyExercises { max: 3, len: 4, .. })
        ));
    }

    #[test]
    fn validate_requires_drops_only_for_drop_sets() {
        let drop = WorkoutConfig::with_names(WorkoutMode::DropSet, ["Curl"], 30, 90);
        assert_eq!(drop.drops_per_exercise, Some(DEFAULT_DROPS_PER_EXERCISE));
        assert!(drop.validate().is_ok());

        let mut paired = WorkoutConfig::with_names(WorkoutMode::PairedSet, ["a", "b"], 40, 60);
        paired.drops_per_exercise = Some(2);
        assert!(paired.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_exercise_time() {
        let config = WorkoutConfig::with_names(WorkoutMode::PairedSet, ["a", "b"], 0, 60);
        assert!(config.validate().is_err());
    }

    #[test]
    fn drops_falls_back_to_default() {
        let mut config = WorkoutConfig::with_names(WorkoutMode::DropSet, ["Curl"], 30, 90);
        config.drops_per_exercise = None;
        assert_eq!(config.drops(), DEFAULT_DROPS_PER_EXERCISE);
        assert_eq!(config.with_drops(5).drops(), 5);
    }

    #[test]
    fn finish_floors_total_time() {
        let start = Utc::now();
        let config = WorkoutConfig::with_names(WorkoutMode::PairedSet, ["a", "b"], 40, 60);
        let session = WorkoutSession::begin(config, start);
        let done = session.finish(4, start + Duration::milliseconds(125_900));
        assert_eq!(done.total_time, 125);
        assert_eq!(done.cycles_completed, 4);
        assert!(done.is_finished());
    }
}
