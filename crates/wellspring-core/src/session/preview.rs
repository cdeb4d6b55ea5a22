//! Dry run of a pattern on a virtual clock.
//!
//! Runs a throwaway [`SessionEngine`] to the end, one tick at a time, and
//! lists where each phase starts. Used to show a session plan before it is
//! started for real.

use serde::{Deserialize, Serialize};

use super::engine::SessionEngine;
use super::sequencer::SessionStatus;
use crate::catalog::PatternDefinition;
use crate::error::SessionError;

/// One phase occurrence on the session timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Seconds from session start.
    pub at_secs: u64,
    pub cycle_index: u32,
    pub phase_index: usize,
    pub phase_name: String,
    pub cue: Option<String>,
    pub duration_secs: u32,
    pub step_index: Option<usize>,
}

pub fn preview(pattern: &PatternDefinition) -> Result<Vec<TimelineEntry>, SessionError> {
    let mut engine = SessionEngine::new();
    engine.start(pattern)?;

    let mut entries = Vec::new();
    let mut last_position = None;

    loop {
        let state = engine.state();
        if state.status == SessionStatus::Completed {
            break;
        }
        let position = (state.cycle_index, state.phase_index);
        if last_position != Some(position) {
            last_position = Some(position);
            if let (Some(progress), Some(phase)) = (
                engine.progress(),
                engine.sequencer().and_then(|s| s.phase(state.phase_index)),
            ) {
                entries.push(TimelineEntry {
                    at_secs: progress.elapsed_secs,
                    cycle_index: state.cycle_index,
                    phase_index: state.phase_index,
                    phase_name: phase.name.clone(),
                    cue: phase.cue.clone(),
                    duration_secs: phase.duration_secs,
                    step_index: progress.step_index,
                });
            }
        }
        if engine.tick().is_none() {
            break;
        }
    }

    Ok(entries)
}
