use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{Boundary, SequencerState, SessionRecord};

/// Every state change of a session produces an Event.
/// Views subscribe to them; the CLI prints them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        pattern_id: String,
        total_secs: u64,
        state: SequencerState,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_id: Uuid,
        state: SequencerState,
        at: DateTime<Utc>,
    },
    SessionResumed {
        session_id: Uuid,
        state: SequencerState,
        at: DateTime<Utc>,
    },
    /// One logical second passed.
    Ticked {
        session_id: Uuid,
        state: SequencerState,
        elapsed_secs: u64,
        boundary: Option<Boundary>,
    },
    SessionCompleted {
        record: SessionRecord,
        at: DateTime<Utc>,
    },
    /// Ended early by the user; still recorded.
    SessionStopped {
        record: SessionRecord,
        at: DateTime<Utc>,
    },
    /// Progress discarded, nothing recorded.
    SessionReset {
        session_id: Option<Uuid>,
        at: DateTime<Utc>,
    },
    /// Tick delivery failed; nothing recorded.
    SessionAborted {
        session_id: Uuid,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-friendly name, as used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SessionPaused { .. } => "session_paused",
            Event::SessionResumed { .. } => "session_resumed",
            Event::Ticked { .. } => "ticked",
            Event::SessionCompleted { .. } => "session_completed",
            Event::SessionStopped { .. } => "session_stopped",
            Event::SessionReset { .. } => "session_reset",
            Event::SessionAborted { .. } => "session_aborted",
        }
    }
}
