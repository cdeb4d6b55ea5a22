//! Session recorder and bounded recent history.
//!
//! Exactly one [`SessionRecord`] is produced per session, on completion or on
//! an early stop. Records are prepended to [`RecentHistory`], which keeps only
//! the newest entries.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CompletionRule, PatternDefinition, PatternKind};

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Share of the scripted duration a script-driven session must reach to count
/// as completed.
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.8;

/// Immutable outcome of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Time-ordered (UUID v7), so sorting by id follows creation order.
    pub id: Uuid,
    pub session_id: Uuid,
    pub pattern_id: String,
    pub pattern_name: String,
    pub kind: PatternKind,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub elapsed_secs: u64,
    pub completed_cycles: u32,
    pub completed: bool,
}

/// Most-recent-first list of records with a fixed capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentHistory {
    records: VecDeque<SessionRecord>,
    capacity: usize,
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Put `record` first, evicting the oldest entry on overflow.
    pub fn push(&mut self, record: SessionRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&SessionRecord> {
        self.records.front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<SessionRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary::default();
        for r in &self.records {
            summary.total_sessions += 1;
            if r.completed {
                summary.completed_sessions += 1;
            }
            summary.total_elapsed_secs += r.elapsed_secs;
            match r.kind {
                PatternKind::Breathing => summary.breathing_sessions += 1,
                PatternKind::Meditation => summary.meditation_sessions += 1,
                PatternKind::Exercise => summary.exercise_sessions += 1,
            }
        }
        summary
    }
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Aggregate counts over the recent history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub total_elapsed_secs: u64,
    pub breathing_sessions: usize,
    pub meditation_sessions: usize,
    pub exercise_sessions: usize,
}

/// Single writer of [`RecentHistory`].
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    history: RecentHistory,
    completion_threshold: f64,
    last_session: Option<Uuid>,
}

impl SessionRecorder {
    pub fn new(capacity: usize, completion_threshold: f64) -> Self {
        Self {
            history: RecentHistory::new(capacity),
            completion_threshold: completion_threshold.clamp(0.0, 1.0),
            last_session: None,
        }
    }

    pub fn history(&self) -> &RecentHistory {
        &self.history
    }

    pub fn completion_threshold(&self) -> f64 {
        self.completion_threshold
    }

    /// Whether a session of `pattern` that ran this far counts as completed.
    pub fn is_completed(
        &self,
        pattern: &PatternDefinition,
        elapsed_secs: u64,
        completed_cycles: u32,
    ) -> bool {
        match pattern.completion {
            CompletionRule::Cycles => completed_cycles >= pattern.cycles,
            CompletionRule::ScriptedDuration => {
                let scripted = pattern.total_duration_secs() as f64;
                elapsed_secs as f64 >= self.completion_threshold * scripted
            }
        }
    }

    /// Create the record for `session_id` and prepend it to the history.
    ///
    /// Returns `None` if this session was already recorded.
    pub fn record_completion(
        &mut self,
        pattern: &PatternDefinition,
        session_id: Uuid,
        started_at: DateTime<Utc>,
        elapsed_secs: u64,
        completed_cycles: u32,
    ) -> Option<SessionRecord> {
        if self.last_session == Some(session_id)
            || self.history.iter().any(|r| r.session_id == session_id)
        {
            return None;
        }

        let record = SessionRecord {
            id: Uuid::now_v7(),
            session_id,
            pattern_id: pattern.id.clone(),
            pattern_name: pattern.name.clone(),
            kind: pattern.kind,
            started_at,
            ended_at: Utc::now(),
            elapsed_secs,
            completed_cycles,
            completed: self.is_completed(pattern, elapsed_secs, completed_cycles),
        };

        self.last_session = Some(session_id);
        self.history.push(record.clone());
        Some(record)
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_COMPLETION_THRESHOLD)
    }
}
