//! End-to-end workout flows through `TimerService`.
//!
//! Every test drives the service with explicit tick counts and a manual
//! clock, so no real time passes.

use std::sync::Arc;

use chrono::Utc;
use fittimer_core::storage::Config;
use fittimer_core::{
    Event, ManualClock, MemoryStore, Phase, TemplatePatch, TemplateQuery, TemplateSort,
    TimerService, WorkoutConfig, WorkoutMode,
};

fn open(clock: &ManualClock) -> TimerService<MemoryStore> {
    TimerService::open(MemoryStore::new(), &Config::default(), Arc::new(clock.clone()))
}

/// Run the current interval to zero and perform the pending advance.
fn complete_interval(service: &mut TimerService<MemoryStore>) -> Option<Event> {
    let remaining = service.state().time_remaining;
    let completed = service.tick(remaining.max(1));
    assert!(matches!(completed, Some(Event::IntervalCompleted { .. })));
    let session_id = service.session()?.id.clone();
    service.finish_interval(&session_id)
}

// ============================================================================
// Mode rules
// ============================================================================

#[test]
fn paired_set_cycles_through_rest() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    service.set_config(WorkoutConfig::with_names(WorkoutMode::PairedSet, ["Bench", "Row"], 40, 60));
    service.start().unwrap();

    let event = complete_interval(&mut service).unwrap();
    assert!(matches!(event, Event::ExerciseAdvanced { exercise_index: 1, .. }));
    assert_eq!(service.state().time_remaining, 40);

    let event = complete_interval(&mut service).unwrap();
    assert!(matches!(event, Event::RestStarted { cycle: 1, .. }));
    assert_eq!(service.engine().phase(), Phase::Resting);
    assert_eq!(service.state().time_remaining, 60);

    let event = complete_interval(&mut service).unwrap();
    assert!(matches!(event, Event::RestEnded { skipped: false, .. }));
    assert_eq!(service.state().current_exercise_index, 0);
    assert_eq!(service.state().current_cycle, 1);

    clock.advance_ms(200_000);
    let session = service.end().unwrap();
    assert_eq!(session.cycles_completed, 1);
    assert_eq!(session.total_time, 200);
}

#[test]
fn drop_set_counts_drops_before_resting() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    service.set_config(WorkoutConfig::with_names(WorkoutMode::DropSet, ["Curl"], 30, 90));
    service.start().unwrap();

    for expected in 1..3u32 {
        let event = complete_interval(&mut service).unwrap();
        assert!(matches!(event, Event::ExerciseAdvanced { drop, .. } if drop == expected));
        assert_eq!(service.state().current_exercise_index, 0);
    }
    let event = complete_interval(&mut service).unwrap();
    assert!(matches!(event, Event::RestStarted { duration_secs: 90, .. }));
    assert_eq!(service.state().current_drop, 0);
    assert_eq!(service.state().current_cycle, 1);
}

#[test]
fn giant_set_visits_every_named_exercise() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    let names = ["A", "B", "", "C", "D", "E", "F", "G"];
    service.set_config(WorkoutConfig::with_names(WorkoutMode::GiantSet, names, 20, 120));
    service.start().unwrap();

    // The unnamed slot is dropped from the workout.
    assert_eq!(service.config().unwrap().exercises.len(), 7);
    for index in 1..7 {
        complete_interval(&mut service);
        assert_eq!(service.state().current_exercise_index, index);
    }
    complete_interval(&mut service);
    assert!(service.state().is_resting);
}

// ============================================================================
// Countdown handling
// ============================================================================

#[test]
fn overshooting_tick_completes_exactly_once() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    service.set_config(WorkoutConfig::with_names(WorkoutMode::TripleSet, ["a", "b", "c"], 45, 75));
    service.start().unwrap();

    assert!(matches!(
        service.tick(500),
        Some(Event::IntervalCompleted { phase: Phase::Exercising, .. })
    ));
    assert!(service.tick(1).is_none());
    assert!(service.tick(30).is_none());
    assert_eq!(service.state().time_remaining, 0);

    // A late advance for an old session is ignored.
    assert!(service.finish_interval("stale-session").is_none());
    assert_eq!(service.state().current_exercise_index, 0);

    let session_id = service.session().unwrap().id.clone();
    assert!(service.finish_interval(&session_id).is_some());
    assert!(service.finish_interval(&session_id).is_none());
    assert_eq!(service.state().current_exercise_index, 1);
}

#[test]
fn warnings_cover_final_seconds() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    service.set_config(WorkoutConfig::with_names(WorkoutMode::DropSet, ["Press"], 5, 10));
    service.start().unwrap();

    let cues: Vec<_> = (0..5).filter_map(|_| service.tick(1)).filter_map(|e| e.cue()).collect();
    assert_eq!(cues.len(), 4);
}

#[test]
fn skip_rest_and_manual_next() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    service.set_config(WorkoutConfig::with_names(WorkoutMode::PairedSet, ["Dip", "Chin"], 40, 60));
    service.start().unwrap();

    assert!(service.skip_rest().is_none());
    service.next().unwrap();
    service.next().unwrap();
    assert!(service.state().is_resting);

    let event = service.skip_rest().unwrap();
    assert!(matches!(event, Event::RestEnded { skipped: true, .. }));
    assert_eq!(service.state().time_remaining, 40);
}

#[test]
fn pause_blocks_ticks_until_resumed() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    service.set_config(WorkoutConfig::with_names(WorkoutMode::PairedSet, ["Dip", "Chin"], 40, 60));
    service.start().unwrap();

    service.pause().unwrap();
    assert!(service.pause().is_none());
    assert!(service.tick(10).is_none());
    assert_eq!(service.state().time_remaining, 40);

    service.resume().unwrap();
    service.tick(10);
    assert_eq!(service.state().time_remaining, 30);
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn template_lifecycle() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    let push = WorkoutConfig::with_names(WorkoutMode::PairedSet, ["Bench", "Fly"], 40, 60);
    let legs = WorkoutConfig::with_names(WorkoutMode::DropSet, ["Leg press"], 30, 90);

    let push_id = service.save_template("Push day", "chest focus", push.clone()).unwrap().id;
    clock.advance_ms(1000);
    let legs_id = service.save_template("Legs", "", legs).unwrap().id;
    assert!(service.save_template("   ", "", push.clone()).is_err());

    let found = service.query_templates(&TemplateQuery::search("CHEST"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, push_id);

    let drops = service.query_templates(&TemplateQuery::default().with_mode(WorkoutMode::DropSet));
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].id, legs_id);

    clock.advance_ms(1000);
    assert!(service.update_template(&push_id, TemplatePatch::name("Push")));
    let recent = service.query_templates(&TemplateQuery::default());
    assert_eq!(recent[0].id, push_id);

    let copy = service.duplicate_template(&push_id).unwrap();
    assert_eq!(copy.name, "Push (copy)");
    assert_eq!(copy.times_used, 0);

    service.load_template(&legs_id).unwrap();
    service.load_template(&legs_id).unwrap();
    let by_use = TemplateQuery::default().sorted_by(TemplateSort::Popular);
    let popular = service.query_templates(&by_use);
    assert_eq!(popular[0].id, legs_id);

    assert!(service.delete_template(&copy.id));
    assert!(!service.delete_template(&copy.id));
    assert_eq!(service.templates().len(), 2);
}

#[test]
fn favorites_are_capped_and_ordered_by_use() {
    let clock = ManualClock::new(Utc::now());
    let mut service = open(&clock);
    let config = WorkoutConfig::with_names(WorkoutMode::DropSet, ["Row"], 30, 60);

    let mut ids = Vec::new();
    for i in 0..7 {
        let id = service.save_template(&format!("T{i}"), "", config.clone()).unwrap().id;
        assert_eq!(service.toggle_favorite(&id), Some(true));
        ids.push(id);
    }
    service.load_template(&ids[6]).unwrap();

    let favorites = service.favorites();
    assert_eq!(favorites.len(), 5);
    assert_eq!(favorites[0].id, ids[6]);
    assert_eq!(service.toggle_favorite(&ids[6]), Some(false));
    assert_eq!(service.toggle_favorite("missing"), None);
}
