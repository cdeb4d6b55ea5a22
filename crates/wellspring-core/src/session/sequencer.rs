//! Phase sequencer.
//!
//! Turns a [`PatternDefinition`] into a deterministic timeline of effective
//! phases and steps a [`SequencerState`] through it one second at a time.
//! No clocks live here; the caller decides when a second has passed.

use serde::{Deserialize, Serialize};

use crate::catalog::PatternDefinition;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Position within a session timeline. Replaced, never mutated, on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerState {
    /// Index into the effective phase list of one cycle.
    pub phase_index: usize,
    /// 0-based, always below the pattern's cycle count.
    pub cycle_index: u32,
    pub remaining_secs: u32,
    pub status: SessionStatus,
}

impl SequencerState {
    pub fn with_status(self, status: SessionStatus) -> Self {
        Self { status, ..self }
    }
}

/// Boundary crossed between two consecutive states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    PhaseChanged,
    CycleCompleted,
    SessionCompleted,
}

impl Boundary {
    /// Most significant boundary crossed going from `prev` to `next`.
    pub fn between(prev: &SequencerState, next: &SequencerState) -> Option<Boundary> {
        if next.status == SessionStatus::Completed && prev.status != SessionStatus::Completed {
            Some(Boundary::SessionCompleted)
        } else if next.cycle_index != prev.cycle_index {
            Some(Boundary::CycleCompleted)
        } else if next.phase_index != prev.phase_index {
            Some(Boundary::PhaseChanged)
        } else {
            None
        }
    }
}

/// A phase that takes part in traversal (positive duration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub duration_secs: u32,
    pub cue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSequencer {
    phases: Vec<Phase>,
    cycles: u32,
}

impl PhaseSequencer {
    /// Build the effective timeline for `pattern`.
    ///
    /// Zero-duration phases are dropped. Fails when nothing is left to run or
    /// when the pattern asks for zero cycles.
    pub fn new(pattern: &PatternDefinition) -> Result<Self, SessionError> {
        if pattern.cycles == 0 {
            return Err(SessionError::configuration(
                &pattern.id,
                "cycles must be at least 1",
            ));
        }

        let phases: Vec<Phase> = pattern
            .phases
            .iter()
            .filter(|p| p.duration_secs > 0)
            .map(|p| Phase {
                name: p.name.clone(),
                duration_secs: p.duration_secs,
                cue: p.cue.clone(),
            })
            .collect();

        if phases.is_empty() {
            return Err(SessionError::configuration(
                &pattern.id,
                "pattern must contain at least one phase with a positive duration",
            ));
        }

        Ok(Self {
            phases,
            cycles: pattern.cycles,
        })
    }

    /// Idle state at the very start of the timeline.
    pub fn initialize(&self) -> SequencerState {
        SequencerState {
            phase_index: 0,
            cycle_index: 0,
            remaining_secs: self.phases[0].duration_secs,
            status: SessionStatus::Idle,
        }
    }

    /// Move `state` forward by one second.
    ///
    /// A completed state is returned unchanged.
    pub fn advance(&self, state: SequencerState) -> SequencerState {
        if state.status == SessionStatus::Completed {
            return state;
        }

        let remaining_secs = state.remaining_secs.saturating_sub(1);
        if remaining_secs > 0 {
            return SequencerState {
                remaining_secs,
                ..state
            };
        }

        if let Some(next) = self.phases.get(state.phase_index + 1) {
            return SequencerState {
                phase_index: state.phase_index + 1,
                remaining_secs: next.duration_secs,
                ..state
            };
        }

        if state.cycle_index + 1 < self.cycles {
            return SequencerState {
                phase_index: 0,
                cycle_index: state.cycle_index + 1,
                remaining_secs: self.phases[0].duration_secs,
                ..state
            };
        }

        SequencerState {
            remaining_secs: 0,
            status: SessionStatus::Completed,
            ..state
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn cycle_duration_secs(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.duration_secs)).sum()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.cycle_duration_secs()
            .saturating_mul(u64::from(self.cycles))
    }

    /// Seconds covered by `state`, derived from its position alone.
    pub fn elapsed_secs(&self, state: &SequencerState) -> u64 {
        if state.status == SessionStatus::Completed {
            return self.total_duration_secs();
        }
        self.cycle_elapsed_secs(state)
            + u64::from(state.cycle_index) * self.cycle_duration_secs()
    }

    /// Seconds covered within the current cycle.
    pub fn cycle_elapsed_secs(&self, state: &SequencerState) -> u64 {
        if state.status == SessionStatus::Completed {
            return self.cycle_duration_secs();
        }
        let before: u64 = self
            .phases
            .iter()
            .take(state.phase_index)
            .map(|p| u64::from(p.duration_secs))
            .sum();
        let current = self
            .phase(state.phase_index)
            .map(|p| p.duration_secs.saturating_sub(state.remaining_secs))
            .unwrap_or(0);
        before + u64::from(current)
    }

    /// Cycles fully run by the time of `state`.
    pub fn completed_cycles(&self, state: &SequencerState) -> u32 {
        if state.status == SessionStatus::Completed {
            self.cycles
        } else {
            state.cycle_index
        }
    }
}

/// Index of the instructional line to show after `elapsed_secs` of a
/// `total_secs` span split evenly across `count` lines.
///
/// The result is clamped to the last line, so `elapsed == total` stays in
/// bounds. Returns `None` only when there are no lines.
pub fn step_index_at(elapsed_secs: u64, total_secs: u64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    if total_secs == 0 {
        return Some(0);
    }
    // floor(t / (total / n)) == floor(t * n / total), kept in integers.
    let raw = u128::from(elapsed_secs) * count as u128 / u128::from(total_secs);
    Some(raw.min(count as u128 - 1) as usize)
}
