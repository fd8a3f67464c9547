//! # FitTimer Core Library
//!
//! Core logic for an interval-training workout timer. A workout alternates
//! timed exercise intervals with rest periods under one of four modes
//! (paired set, triple set, drop set, giant set).
//!
//! ## Architecture
//!
//! - **Timer**: a deterministic state machine ([`WorkoutEngine`]) plus a
//!   wall-clock [`Ticker`] that reports whole elapsed seconds
//! - **History**: a bounded, most-recent-first ledger of finished sessions
//! - **Templates**: named, reusable workout configurations
//! - **Storage**: JSON aggregates in SQLite, TOML settings, and a bridge that
//!   restores an interrupted workout on startup
//!
//! ## Key Components
//!
//! - [`TimerService`]: owns all application state and persists every change
//! - [`WorkoutRunner`]: drives a service in real time and emits feedback cues
//! - [`SqliteStore`]: durable aggregate storage
//! - [`Config`]: application settings

pub mod error;
pub mod events;
pub mod feedback;
pub mod history;
pub mod logging;
pub mod runner;
pub mod service;
pub mod storage;
pub mod templates;
pub mod timer;
pub mod workout;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use feedback::{Channel, Cue, Feedback, LogFeedback, NoopFeedback, RecordingFeedback};
pub use history::{format_duration, History, HistorySummary};
pub use runner::WorkoutRunner;
pub use service::TimerService;
pub use storage::{AggregateStore, Config, MemoryStore, PersistenceBridge, SqliteStore};
pub use templates::{TemplatePatch, TemplateQuery, TemplateSort, TemplateStore, WorkoutTemplate};
pub use timer::{Clock, ManualClock, Phase, SystemClock, Ticker, TimerState, WorkoutEngine};
pub use workout::{Exercise, WorkoutConfig, WorkoutMode, WorkoutSession};
