//! Session engine implementation.
//!
//! The session engine is the logical clock of a guided session. It does not use
//! internal threads - the caller is responsible for calling `tick()` once per
//! second while a session runs (see [`SessionClock`](super::SessionClock) for a
//! driver that does this on a tokio task).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running -> Completed          (last phase of last cycle ran out)
//! Running | Paused -> Idle      (stop: recorded, reset: discarded)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new();
//! engine.start(&pattern)?;
//! // Once per second:
//! engine.tick(); // Returns Some(Event::SessionCompleted { .. }) at the end
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::progress::{Progress, ProgressProjector};
use super::recorder::{RecentHistory, SessionRecord, SessionRecorder};
use super::sequencer::{Boundary, PhaseSequencer, SequencerState, SessionStatus};
use crate::catalog::PatternDefinition;
use crate::error::{SessionError, TickError};
use crate::events::Event;

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&Event) + Send>;

/// Pattern currently loaded into the engine.
struct Loaded {
    pattern: PatternDefinition,
    sequencer: PhaseSequencer,
}

/// Bookkeeping for the session in flight.
struct Run {
    id: Uuid,
    started_at: DateTime<Utc>,
    elapsed_secs: u64,
}

/// Core session engine.
///
/// Owns the only writable [`SequencerState`] of its session and the
/// [`SessionRecorder`] that holds recent history.
pub struct SessionEngine {
    loaded: Option<Loaded>,
    run: Option<Run>,
    state: SequencerState,
    recorder: SessionRecorder,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::with_recorder(SessionRecorder::default())
    }

    pub fn with_recorder(recorder: SessionRecorder) -> Self {
        Self {
            loaded: None,
            run: None,
            state: blank_state(),
            recorder,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.run.as_ref().map(|r| r.id)
    }

    pub fn pattern(&self) -> Option<&PatternDefinition> {
        self.loaded.as_ref().map(|l| &l.pattern)
    }

    pub fn sequencer(&self) -> Option<&PhaseSequencer> {
        self.loaded.as_ref().map(|l| &l.sequencer)
    }

    /// Seconds actually ticked in the current session. Paused time is not
    /// counted.
    pub fn elapsed_secs(&self) -> u64 {
        self.run.as_ref().map(|r| r.elapsed_secs).unwrap_or(0)
    }

    pub fn completed_cycles(&self) -> u32 {
        self.loaded
            .as_ref()
            .map(|l| l.sequencer.completed_cycles(&self.state))
            .unwrap_or(0)
    }

    pub fn progress(&self) -> Option<Progress> {
        let loaded = self.loaded.as_ref()?;
        Some(ProgressProjector::new(&loaded.pattern, &loaded.sequencer).project(&self.state))
    }

    pub fn history(&self) -> &RecentHistory {
        self.recorder.history()
    }

    /// Most-recent-first copy of the bounded history.
    pub fn recent_history(&self) -> Vec<SessionRecord> {
        self.recorder.history().to_vec()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register a callback fired on every tick and every status transition.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load `pattern` and start running it from the beginning.
    ///
    /// An invalid pattern is rejected before anything changes. A session that
    /// is still in flight is discarded without a record.
    pub fn start(&mut self, pattern: &PatternDefinition) -> Result<Event, SessionError> {
        let sequencer = PhaseSequencer::new(pattern)?;

        if let Some(previous) = self.in_flight() {
            info!(session_id = %previous, "discarding unfinished session for a new start");
        }

        let run = Run {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            elapsed_secs: 0,
        };
        let session_id = run.id;
        self.state = sequencer.initialize().with_status(SessionStatus::Running);
        self.loaded = Some(Loaded {
            pattern: pattern.clone(),
            sequencer,
        });
        self.run = Some(run);

        info!(%session_id, pattern = %pattern.id, "session started");
        let event = Event::SessionStarted {
            session_id,
            pattern_id: pattern.id.clone(),
            total_secs: pattern.total_duration_secs(),
            state: self.state,
            at: Utc::now(),
        };
        self.publish(&event);
        Ok(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.status != SessionStatus::Running {
            debug!(status = ?self.state.status, "pause ignored");
            return None;
        }
        let session_id = self.session_id()?;
        self.state = self.state.with_status(SessionStatus::Paused);
        let event = Event::SessionPaused {
            session_id,
            state: self.state,
            at: Utc::now(),
        };
        self.publish(&event);
        Some(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.status != SessionStatus::Paused {
            debug!(status = ?self.state.status, "resume ignored");
            return None;
        }
        let session_id = self.session_id()?;
        self.state = self.state.with_status(SessionStatus::Running);
        let event = Event::SessionResumed {
            session_id,
            state: self.state,
            at: Utc::now(),
        };
        self.publish(&event);
        Some(event)
    }

    /// Advance one second. Only a running session moves.
    ///
    /// Returns `Some(Event::SessionCompleted)` on the tick that finishes the
    /// session, `Some(Event::Ticked)` otherwise, and `None` when not running.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.status != SessionStatus::Running {
            return None;
        }
        let loaded = self.loaded.as_ref()?;
        let run = self.run.as_mut()?;

        let prev = self.state;
        let next = loaded.sequencer.advance(prev);
        run.elapsed_secs += 1;
        self.state = next;

        let boundary = Boundary::between(&prev, &next);
        if let Some(boundary) = boundary {
            debug!(session_id = %run.id, ?boundary, phase = next.phase_index, cycle = next.cycle_index, "boundary crossed");
        }
        let ticked = Event::Ticked {
            session_id: run.id,
            state: next,
            elapsed_secs: run.elapsed_secs,
            boundary,
        };
        self.publish(&ticked);

        if next.status != SessionStatus::Completed {
            return Some(ticked);
        }

        let record = self.record()?;
        info!(session_id = %record.session_id, completed = record.completed, "session completed");
        let event = Event::SessionCompleted {
            record,
            at: Utc::now(),
        };
        self.publish(&event);
        Some(event)
    }

    /// End the session early and record it.
    ///
    /// Does nothing once the session completed (it is already recorded) or
    /// when no session is in flight.
    pub fn stop(&mut self) -> Option<Event> {
        if !matches!(self.state.status, SessionStatus::Running | SessionStatus::Paused) {
            debug!(status = ?self.state.status, "stop ignored");
            return None;
        }
        let record = self.record()?;
        info!(session_id = %record.session_id, elapsed_secs = record.elapsed_secs, "session stopped");
        self.clear_to_idle();
        let event = Event::SessionStopped {
            record,
            at: Utc::now(),
        };
        self.publish(&event);
        Some(event)
    }

    /// Discard all progress without recording anything.
    pub fn reset(&mut self) -> Option<Event> {
        let session_id = self.session_id();
        self.clear_to_idle();
        info!(session_id = ?session_id, "session reset");
        let event = Event::SessionReset {
            session_id,
            at: Utc::now(),
        };
        self.publish(&event);
        Some(event)
    }

    /// Tick delivery failed: drop the session to Idle without a record, since
    /// its elapsed time can no longer be trusted.
    pub fn abort(&mut self, error: &TickError) -> Option<Event> {
        let session_id = self.in_flight()?;
        warn!(%session_id, %error, "session aborted");
        self.clear_to_idle();
        let event = Event::SessionAborted {
            session_id,
            reason: error.to_string(),
            at: Utc::now(),
        };
        self.publish(&event);
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Id of a session that is running or paused.
    fn in_flight(&self) -> Option<Uuid> {
        match self.state.status {
            SessionStatus::Running | SessionStatus::Paused => self.session_id(),
            SessionStatus::Idle | SessionStatus::Completed => None,
        }
    }

    fn record(&mut self) -> Option<SessionRecord> {
        let loaded = self.loaded.as_ref()?;
        let run = self.run.as_ref()?;
        let completed_cycles = loaded.sequencer.completed_cycles(&self.state);
        self.recorder.record_completion(
            &loaded.pattern,
            run.id,
            run.started_at,
            run.elapsed_secs,
            completed_cycles,
        )
    }

    fn clear_to_idle(&mut self) {
        self.run = None;
        self.state = self
            .loaded
            .as_ref()
            .map(|l| l.sequencer.initialize())
            .unwrap_or_else(blank_state);
    }

    fn publish(&mut self, event: &Event) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event);
        }
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("pattern", &self.pattern().map(|p| p.id.as_str()))
            .field("session_id", &self.session_id())
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

fn blank_state() -> SequencerState {
    SequencerState {
        phase_index: 0,
        cycle_index: 0,
        remaining_secs: 0,
        status: SessionStatus::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::sync::{Arc, Mutex};

    fn box_breathing() -> PatternDefinition {
        Catalog::builtin().get("box").unwrap().clone()
    }

    fn collect_events(engine: &mut SessionEngine) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        engine.subscribe(move |e| sink.lock().unwrap().push(e.name().to_string()));
        seen
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = SessionEngine::new();
        assert_eq!(engine.status(), SessionStatus::Idle);

        assert!(engine.start(&box_breathing()).is_ok());
        assert_eq!(engine.status(), SessionStatus::Running);

        assert!(engine.pause().is_some());
        assert_eq!(engine.status(), SessionStatus::Paused);

        assert!(engine.resume().is_some());
        assert_eq!(engine.status(), SessionStatus::Running);
    }

    #[test]
    fn mismatched_transitions_are_no_ops() {
        let mut engine = SessionEngine::new();
        assert!(engine.pause().is_none());
        assert!(engine.resume().is_none());
        assert!(engine.stop().is_none());

        engine.start(&box_breathing()).unwrap();
        assert!(engine.resume().is_none());
        engine.pause().unwrap();
        assert!(engine.pause().is_none());
        assert_eq!(engine.status(), SessionStatus::Paused);
    }

    #[test]
    fn ticks_while_paused_do_nothing() {
        let mut engine = SessionEngine::new();
        engine.start(&box_breathing()).unwrap();
        engine.tick();
        engine.tick();
        engine.pause();
        let before = engine.state();
        for _ in 0..30 {
            assert!(engine.tick().is_none());
        }
        engine.resume();
        assert_eq!(engine.state().remaining_secs, before.remaining_secs);
        assert_eq!(engine.state().phase_index, before.phase_index);
        assert_eq!(engine.elapsed_secs(), 2);
    }

    #[test]
    fn full_run_records_once() {
        let mut engine = SessionEngine::new();
        let seen = collect_events(&mut engine);
        engine.start(&box_breathing()).unwrap();

        let mut last = None;
        for _ in 0..128 {
            last = engine.tick();
        }
        assert!(matches!(last, Some(Event::SessionCompleted { .. })));
        assert_eq!(engine.status(), SessionStatus::Completed);
        assert_eq!(engine.completed_cycles(), 8);

        assert!(engine.tick().is_none());
        assert!(engine.stop().is_none());

        let history = engine.recent_history();
        assert_eq!(history.len(), 1);
        assert!(history[0].completed);
        assert_eq!(history[0].elapsed_secs, 128);
        assert_eq!(history[0].completed_cycles, 8);

        let names = seen.lock().unwrap();
        assert_eq!(names.first().map(String::as_str), Some("session_started"));
        assert_eq!(names.iter().filter(|n| *n == "ticked").count(), 128);
        assert_eq!(names.iter().filter(|n| *n == "session_completed").count(), 1);
    }

    #[test]
    fn stop_records_partial_session() {
        let mut engine = SessionEngine::new();
        engine.start(&box_breathing()).unwrap();
        for _ in 0..20 {
            engine.tick();
        }
        match engine.stop() {
            Some(Event::SessionStopped { record, .. }) => {
                assert!(!record.completed);
                assert_eq!(record.completed_cycles, 1);
                assert_eq!(record.elapsed_secs, 20);
            }
            other => panic!("expected SessionStopped, got {other:?}"),
        }
        assert_eq!(engine.status(), SessionStatus::Idle);
        assert!(engine.stop().is_none());
        assert_eq!(engine.recent_history().len(), 1);
    }

    #[test]
    fn stopped_meditation_past_threshold_counts_as_completed() {
        let pattern = Catalog::builtin().get("rain").unwrap().clone();
        let mut engine = SessionEngine::new();
        engine.start(&pattern).unwrap();
        for _ in 0..480 {
            engine.tick();
        }
        match engine.stop() {
            Some(Event::SessionStopped { record, .. }) => assert!(record.completed),
            other => panic!("expected SessionStopped, got {other:?}"),
        }
    }

    #[test]
    fn reset_discards_without_record() {
        let mut engine = SessionEngine::new();
        engine.start(&box_breathing()).unwrap();
        for _ in 0..37 {
            engine.tick();
        }
        assert!(matches!(engine.reset(), Some(Event::SessionReset { .. })));
        let state = engine.state();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.cycle_index, 0);
        assert_eq!(state.phase_index, 0);
        assert_eq!(state.remaining_secs, 4);
        assert!(engine.recent_history().is_empty());
        assert!(engine.tick().is_none());
    }

    #[test]
    fn invalid_pattern_leaves_running_session_alone() {
        let mut engine = SessionEngine::new();
        engine.start(&box_breathing()).unwrap();
        engine.tick();
        let mut broken = box_breathing();
        broken.cycles = 0;
        assert!(matches!(
            engine.start(&broken),
            Err(SessionError::Configuration { .. })
        ));
        assert_eq!(engine.status(), SessionStatus::Running);
        assert_eq!(engine.elapsed_secs(), 1);
    }

    #[test]
    fn restart_discards_previous_session() {
        let mut engine = SessionEngine::new();
        engine.start(&box_breathing()).unwrap();
        let first = engine.session_id().unwrap();
        engine.tick();
        engine.start(&box_breathing()).unwrap();
        assert_ne!(engine.session_id(), Some(first));
        assert_eq!(engine.elapsed_secs(), 0);
        assert!(engine.recent_history().is_empty());
    }

    #[test]
    fn abort_goes_idle_without_record() {
        let mut engine = SessionEngine::new();
        let seen = collect_events(&mut engine);
        engine.start(&box_breathing()).unwrap();
        engine.tick();
        assert!(engine.abort(&TickError::Closed).is_some());
        assert_eq!(engine.status(), SessionStatus::Idle);
        assert!(engine.recent_history().is_empty());
        assert!(engine.abort(&TickError::Closed).is_none());
        assert!(seen.lock().unwrap().contains(&"session_aborted".to_string()));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut engine = SessionEngine::new();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let id = engine.subscribe(move |_| *sink.lock().unwrap() += 1);
        engine.start(&box_breathing()).unwrap();
        assert!(engine.unsubscribe(id));
        engine.tick();
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(!engine.unsubscribe(id));
    }

    #[test]
    fn progress_follows_state() {
        let mut engine = SessionEngine::new();
        assert!(engine.progress().is_none());
        engine.start(&box_breathing()).unwrap();
        for _ in 0..6 {
            engine.tick();
        }
        let progress = engine.progress().unwrap();
        assert_eq!(progress.phase_name, "hold");
        assert_eq!(progress.remaining_secs, 2);
        assert_eq!(progress.elapsed_secs, 6);
    }
}
