//! Guided timed sessions.
//!
//! - [`PhaseSequencer`]: pure phase/cycle arithmetic over a pattern
//! - [`SessionEngine`]: lifecycle state machine, ticked by the caller
//! - [`SessionClock`]: drives an engine from a [`TickSource`] on a tokio task
//! - [`ProgressProjector`]: display metrics derived from state
//! - [`SessionRecorder`]: completion rules and bounded recent history

pub mod clock;
pub mod engine;
pub mod preview;
pub mod progress;
pub mod recorder;
pub mod sequencer;

pub use clock::{manual_ticks, IntervalTicks, ManualTickHandle, ManualTicks, SessionClock, TickSource};
pub use engine::{SessionEngine, SubscriptionId};
pub use preview::{preview, TimelineEntry};
pub use progress::{Progress, ProgressProjector};
pub use recorder::{
    HistorySummary, RecentHistory, SessionRecord, SessionRecorder, DEFAULT_COMPLETION_THRESHOLD,
    DEFAULT_HISTORY_CAPACITY,
};
pub use sequencer::{step_index_at, Boundary, Phase, PhaseSequencer, SequencerState, SessionStatus};
