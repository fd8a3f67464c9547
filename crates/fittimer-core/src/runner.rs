//! Live workout driver.
//!
//! `WorkoutRunner` wires a [`Ticker`] to a shared [`TimerService`]. Each
//! report of elapsed seconds is applied as one tick; cue-bearing events go to
//! the [`Feedback`] backend. When an interval completes the advance runs after
//! a short delay so the completion cue can play first.
//!
//! The ticker only runs while the countdown does. Pausing stops it and
//! resuming starts a fresh one, so time spent paused (including any partial
//! second) is never charged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::events::Event;
use crate::feedback::Feedback;
use crate::service::TimerService;
use crate::storage::{AggregateStore, Config};
use crate::timer::Ticker;

pub type SharedService<S> = Arc<Mutex<TimerService<S>>>;

pub struct WorkoutRunner<S> {
    service: SharedService<S>,
    ticker: Ticker,
    feedback: Arc<dyn Feedback>,
    feedback_enabled: bool,
    advance_delay: Duration,
}

impl<S: AggregateStore + 'static> WorkoutRunner<S> {
    pub fn new(service: TimerService<S>, feedback: Arc<dyn Feedback>, settings: &Config) -> Self {
        let ticker =
            Ticker::new(service.clock()).with_poll_interval(settings.timer.poll_interval());
        Self {
            service: Arc::new(Mutex::new(service)),
            ticker,
            feedback,
            feedback_enabled: settings.feedback.enabled,
            advance_delay: settings.timer.advance_delay(),
        }
    }

    /// Handle for hosts that render from the service state.
    pub fn service(&self) -> SharedService<S> {
        Arc::clone(&self.service)
    }

    /// Run `f` with the service locked.
    pub fn with_service<R>(&self, f: impl FnOnce(&mut TimerService<S>) -> R) -> R {
        f(&mut lock(&self.service))
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// Start a workout and begin counting down. Must be called from within a
    /// tokio runtime.
    pub fn start(&mut self) -> Option<Event> {
        let event = lock(&self.service).start()?;
        self.spawn_ticker();
        Some(event)
    }

    /// Resume counting for a session restored at startup. Returns `false`
    /// when there is nothing to resume. A session saved while paused stays
    /// paused until [`resume`](Self::resume).
    pub fn resume_restored(&mut self) -> bool {
        let (active, paused) = {
            let service = lock(&self.service);
            (service.engine().is_active(), service.state().is_paused)
        };
        if active && !paused && !self.ticker.is_running() {
            self.spawn_ticker();
        }
        active
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = lock(&self.service).pause()?;
        self.ticker.stop();
        Some(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let event = lock(&self.service).resume()?;
        self.spawn_ticker();
        Some(event)
    }

    pub fn next(&self) -> Option<Event> {
        lock(&self.service).next()
    }

    pub fn skip_rest(&self) -> Option<Event> {
        lock(&self.service).skip_rest()
    }

    /// Finish the workout. The session itself is in the service history.
    pub fn end(&mut self) -> Option<Event> {
        self.ticker.stop();
        let session = lock(&self.service).end()?;
        Some(Event::workout_ended(&session))
    }

    pub fn reset(&mut self) -> Event {
        self.ticker.stop();
        lock(&self.service).reset()
    }

    fn spawn_ticker(&mut self) {
        let service = Arc::clone(&self.service);
        let feedback = self.feedback_enabled.then(|| Arc::clone(&self.feedback));
        let delay = self.advance_delay;

        self.ticker.start(move |secs| {
            let Some(event) = lock(&service).tick(secs) else {
                return;
            };
            if let (Some(feedback), Some(cue)) = (&feedback, event.cue()) {
                feedback.cue(cue);
            }
            if let Event::IntervalCompleted { session_id, .. } = event {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    lock(&service).finish_interval(&session_id);
                });
            }
        });
    }
}

fn lock<S>(service: &Mutex<TimerService<S>>) -> MutexGuard<'_, TimerService<S>> {
    service.lock().unwrap_or_else(PoisonError::into_inner)
}
