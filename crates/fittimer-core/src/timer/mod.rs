mod clock;
mod engine;
mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{ActiveSessionSnapshot, Phase, TimerState, WorkoutEngine, DEFAULT_WARNING_SECS};
pub use ticker::{ElapsedTracker, Ticker, DEFAULT_POLL_INTERVAL};
