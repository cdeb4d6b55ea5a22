//! End-to-end session lifecycles against the built-in catalog.
//!
//! Drives the engine directly (virtual clock) and through the tokio driver
//! with manual ticks, checking what a view would observe.

use std::sync::{Arc, Mutex};

use wellspring_core::catalog::Catalog;
use wellspring_core::session::{manual_ticks, Boundary, SessionClock, SessionEngine, SessionStatus};
use wellspring_core::{Config, Event, PatternKind};

fn run_to_end(engine: &mut SessionEngine) -> Event {
    loop {
        match engine.tick() {
            Some(event @ Event::SessionCompleted { .. }) => return event,
            Some(_) => {}
            None => panic!("session stopped ticking before completion"),
        }
    }
}

#[test]
fn every_catalog_pattern_runs_to_completion() {
    let catalog = Catalog::builtin();
    let mut engine = SessionEngine::new();

    for pattern in catalog.patterns() {
        engine.start(pattern).unwrap();
        let Event::SessionCompleted { record, .. } = run_to_end(&mut engine) else {
            unreachable!()
        };
        assert_eq!(record.pattern_id, pattern.id);
        assert_eq!(record.elapsed_secs, pattern.total_duration_secs(), "{}", pattern.id);
        assert!(record.completed, "{}", pattern.id);
        assert_eq!(engine.progress().unwrap().percent_complete, 100.0);
    }

    // Capacity 10: only the most recent ten survive, newest first.
    let history = engine.recent_history();
    assert_eq!(history.len(), 10);
    assert_eq!(
        history[0].pattern_id,
        catalog.patterns().last().unwrap().id
    );
}

#[test]
fn routine_runs_as_one_cycle_of_exercises() {
    let catalog = Catalog::builtin();
    let pattern = catalog.routine_pattern("office-break").unwrap();
    let mut engine = SessionEngine::new();

    let mut phase_changes = 0;
    engine.subscribe(|_| {});
    engine.start(&pattern).unwrap();
    loop {
        match engine.tick() {
            Some(Event::Ticked {
                boundary: Some(Boundary::PhaseChanged),
                ..
            }) => phase_changes += 1,
            Some(Event::SessionCompleted { record, .. }) => {
                assert_eq!(record.kind, PatternKind::Exercise);
                assert_eq!(record.completed_cycles, 1);
                break;
            }
            Some(_) => {}
            None => panic!("routine stalled"),
        }
    }
    assert_eq!(phase_changes, pattern.phases.len() - 1);
}

#[test]
fn stopped_meditation_counts_past_threshold() {
    let catalog = Catalog::builtin();
    let pattern = catalog.get("rain").unwrap();
    let total = pattern.total_duration_secs();
    let mut engine = SessionEngine::with_recorder(Config::default().session.recorder());

    engine.start(pattern).unwrap();
    for _ in 0..(total * 8 / 10) {
        engine.tick();
    }
    let Some(Event::SessionStopped { record, .. }) = engine.stop() else {
        panic!("expected a stop event");
    };
    assert!(record.completed);
    assert_eq!(engine.status(), SessionStatus::Idle);

    engine.start(pattern).unwrap();
    for _ in 0..(total / 2) {
        engine.tick();
    }
    let Some(Event::SessionStopped { record, .. }) = engine.stop() else {
        panic!("expected a stop event");
    };
    assert!(!record.completed);

    let summary = engine.history().summary();
    assert_eq!(summary.total_sessions, 2);
    assert_eq!(summary.completed_sessions, 1);
    assert_eq!(summary.meditation_sessions, 2);
}

#[tokio::test]
async fn driver_delivers_events_to_subscribers() {
    let catalog = Catalog::builtin();
    let pattern = catalog.get("478").unwrap();
    let (ticks, source) = manual_ticks();
    let clock = SessionClock::new(SessionEngine::new(), source);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    clock.subscribe(move |event| sink.lock().unwrap().push(event.name()));

    clock.start(pattern).unwrap();
    ticks.tick_n(pattern.total_duration_secs() as usize);

    for _ in 0..200 {
        if clock.status() == SessionStatus::Completed {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(clock.status(), SessionStatus::Completed);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&"session_started"));
    assert_eq!(seen.last(), Some(&"session_completed"));
    assert_eq!(seen.iter().filter(|n| **n == "ticked").count(), 114);
    assert_eq!(clock.recent_history().len(), 1);
}

#[test]
fn events_serialize_with_type_tag() {
    let catalog = Catalog::builtin();
    let mut engine = SessionEngine::new();
    let started = engine.start(catalog.get("box").unwrap()).unwrap();
    let json = serde_json::to_value(&started).unwrap();
    assert_eq!(json["type"], "SessionStarted");
    assert_eq!(json["pattern_id"], "box");
    assert_eq!(json["total_secs"], 128);
}
