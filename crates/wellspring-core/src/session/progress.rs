//! Read-only projection of display metrics.
//!
//! Breathing, meditation and exercise views all read the same [`Progress`]
//! values, computed from the sequencer state and the pattern alone.

use serde::{Deserialize, Serialize};

use super::sequencer::{step_index_at, PhaseSequencer, SequencerState, SessionStatus};
use crate::catalog::{PatternDefinition, ScriptScope};

/// Snapshot of everything a session view shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub status: SessionStatus,
    /// 0.0 ..= 100.0, exactly 100 only once completed.
    pub percent_complete: f64,
    pub phase_index: usize,
    pub phase_name: String,
    pub cue: Option<String>,
    pub remaining_secs: u32,
    pub cycle_index: u32,
    /// 1-based cycle number for "Cycle N of M" labels.
    pub display_cycle: u32,
    pub cycles: u32,
    pub elapsed_secs: u64,
    pub total_secs: u64,
    pub step_index: Option<usize>,
    pub step_count: usize,
    pub step_text: Option<String>,
}

pub struct ProgressProjector<'a> {
    pattern: &'a PatternDefinition,
    sequencer: &'a PhaseSequencer,
}

impl<'a> ProgressProjector<'a> {
    pub fn new(pattern: &'a PatternDefinition, sequencer: &'a PhaseSequencer) -> Self {
        Self { pattern, sequencer }
    }

    /// Phase-weighted completion: every effective phase counts the same,
    /// with the current phase contributing the fraction already elapsed.
    pub fn percent_complete(&self, state: &SequencerState) -> f64 {
        if state.status == SessionStatus::Completed {
            return 100.0;
        }

        let phase_count = self.sequencer.phase_count() as f64;
        let slots = f64::from(self.sequencer.cycles()) * phase_count;
        if slots == 0.0 {
            return 0.0;
        }

        let fraction = self
            .sequencer
            .phase(state.phase_index)
            .map(|p| {
                let done = p.duration_secs.saturating_sub(state.remaining_secs);
                f64::from(done) / f64::from(p.duration_secs)
            })
            .unwrap_or(0.0);

        let position = f64::from(state.cycle_index) * phase_count + state.phase_index as f64 + fraction;
        (position / slots * 100.0).clamp(0.0, 100.0)
    }

    /// Index of the script line to show, if the pattern has a script.
    pub fn step_index(&self, state: &SequencerState) -> Option<usize> {
        let count = self.pattern.script.len();
        match self.pattern.script_scope {
            ScriptScope::Session => step_index_at(
                self.sequencer.elapsed_secs(state),
                self.sequencer.total_duration_secs(),
                count,
            ),
            ScriptScope::Cycle => step_index_at(
                self.sequencer.cycle_elapsed_secs(state),
                self.sequencer.cycle_duration_secs(),
                count,
            ),
        }
    }

    pub fn project(&self, state: &SequencerState) -> Progress {
        let phase = self.sequencer.phase(state.phase_index);
        let step_index = self.step_index(state);
        Progress {
            status: state.status,
            percent_complete: self.percent_complete(state),
            phase_index: state.phase_index,
            phase_name: phase.map(|p| p.name.clone()).unwrap_or_default(),
            cue: phase.and_then(|p| p.cue.clone()),
            remaining_secs: state.remaining_secs,
            cycle_index: state.cycle_index,
            display_cycle: state.cycle_index + 1,
            cycles: self.sequencer.cycles(),
            elapsed_secs: self.sequencer.elapsed_secs(state),
            total_secs: self.sequencer.total_duration_secs(),
            step_index,
            step_count: self.pattern.script.len(),
            step_text: step_index.and_then(|i| self.pattern.script.get(i).cloned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn running(seq: &PhaseSequencer, ticks: usize) -> SequencerState {
        let mut state = seq.initialize().with_status(SessionStatus::Running);
        for _ in 0..ticks {
            state = seq.advance(state);
        }
        state
    }

    #[test]
    fn idle_is_zero_and_completed_is_hundred() {
        let catalog = Catalog::builtin();
        let pattern = catalog.get("box").unwrap();
        let seq = PhaseSequencer::new(pattern).unwrap();
        let projector = ProgressProjector::new(pattern, &seq);
        assert_eq!(projector.percent_complete(&seq.initialize()), 0.0);
        assert_eq!(projector.percent_complete(&running(&seq, 128)), 100.0);
        assert!(projector.percent_complete(&running(&seq, 127)) < 100.0);
    }

    #[test]
    fn one_box_cycle_is_an_eighth() {
        let catalog = Catalog::builtin();
        let pattern = catalog.get("box").unwrap();
        let seq = PhaseSequencer::new(pattern).unwrap();
        let projector = ProgressProjector::new(pattern, &seq);
        let pct = projector.percent_complete(&running(&seq, 16));
        assert!((pct - 12.5).abs() < 1e-9, "got {pct}");
    }

    #[test]
    fn percent_never_decreases() {
        let catalog = Catalog::builtin();
        for pattern in catalog.patterns() {
            let seq = PhaseSequencer::new(pattern).unwrap();
            let projector = ProgressProjector::new(pattern, &seq);
            let mut state = seq.initialize().with_status(SessionStatus::Running);
            let mut last = projector.percent_complete(&state);
            for _ in 0..=seq.total_duration_secs() {
                state = seq.advance(state);
                let pct = projector.percent_complete(&state);
                assert!(pct >= last, "{}: {pct} < {last}", pattern.id);
                assert!(pct <= 100.0);
                last = pct;
            }
            assert_eq!(last, 100.0);
        }
    }

    #[test]
    fn meditation_step_text_follows_elapsed_time() {
        let catalog = Catalog::builtin();
        let pattern = catalog.get("progressive-relaxation").unwrap();
        let seq = PhaseSequencer::new(pattern).unwrap();
        let projector = ProgressProjector::new(pattern, &seq);

        let halfway = projector.project(&running(&seq, 450));
        assert_eq!(halfway.step_index, Some(6));
        assert_eq!(halfway.step_text.as_deref(), Some(pattern.script[6].as_str()));
        assert_eq!(halfway.step_count, 12);

        let done = projector.project(&running(&seq, 900));
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.step_index, Some(11));
    }

    #[test]
    fn exercise_script_restarts_each_set() {
        let catalog = Catalog::builtin();
        let pattern = catalog.get("neck-roll").unwrap();
        let seq = PhaseSequencer::new(pattern).unwrap();
        let projector = ProgressProjector::new(pattern, &seq);

        // 60s set over 6 instructions: a new line every 10 seconds.
        assert_eq!(projector.step_index(&running(&seq, 25)), Some(2));
        let second_set = projector.project(&running(&seq, 60));
        assert_eq!(second_set.display_cycle, 2);
        assert_eq!(second_set.step_index, Some(0));
    }

    #[test]
    fn breathing_projection_has_no_script() {
        let catalog = Catalog::builtin();
        let pattern = catalog.get("478").unwrap();
        let seq = PhaseSequencer::new(pattern).unwrap();
        let projector = ProgressProjector::new(pattern, &seq);
        let progress = projector.project(&running(&seq, 5));
        assert_eq!(progress.phase_name, "hold");
        assert_eq!(progress.cue.as_deref(), Some("Hold"));
        assert_eq!(progress.remaining_secs, 6);
        assert_eq!(progress.step_index, None);
        assert_eq!(progress.step_text, None);
        assert_eq!(progress.cycles, 6);
        assert_eq!(progress.total_secs, 114);
    }
}
