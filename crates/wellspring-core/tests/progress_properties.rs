//! Property tests over arbitrary patterns and command sequences.

use proptest::prelude::*;

use wellspring_core::catalog::{
    CompletionRule, Difficulty, PatternDefinition, PatternKind, PhaseSpec, ScriptScope,
};
use wellspring_core::session::{PhaseSequencer, SessionEngine, SessionStatus};

fn pattern(durations: Vec<u32>, cycles: u32, script_lines: usize) -> PatternDefinition {
    PatternDefinition {
        id: "generated".into(),
        name: "Generated".into(),
        kind: PatternKind::Breathing,
        description: String::new(),
        category: "breathing".into(),
        difficulty: Difficulty::Beginner,
        phases: durations
            .into_iter()
            .enumerate()
            .map(|(i, d)| PhaseSpec::new(format!("phase-{i}"), d))
            .collect(),
        cycles,
        script: (0..script_lines).map(|i| format!("line {i}")).collect(),
        script_scope: ScriptScope::Session,
        completion: CompletionRule::Cycles,
        benefits: Vec::new(),
        precautions: Vec::new(),
    }
}

/// Patterns with at least one positive phase.
fn valid_pattern() -> impl Strategy<Value = PatternDefinition> {
    (
        prop::collection::vec(0u32..6, 1..5),
        1u32..4,
        0usize..8,
    )
        .prop_filter("needs a positive phase", |(d, _, _)| d.iter().any(|&x| x > 0))
        .prop_map(|(d, c, s)| pattern(d, c, s))
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Tick,
    Pause,
    Resume,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![6 => Just(Op::Tick), 1 => Just(Op::Pause), 1 => Just(Op::Resume)]
}

proptest! {
    #[test]
    fn percent_is_monotonic_and_ends_at_hundred(pattern in valid_pattern()) {
        let mut engine = SessionEngine::new();
        engine.start(&pattern).unwrap();

        let total = pattern.total_duration_secs();
        let mut last = engine.progress().unwrap().percent_complete;
        let mut last_step = engine.progress().unwrap().step_index;
        for tick in 1..=total {
            engine.tick();
            let progress = engine.progress().unwrap();
            prop_assert!(progress.percent_complete >= last);
            prop_assert!(progress.step_index >= last_step);
            prop_assert_eq!(progress.elapsed_secs, tick);
            if tick < total {
                prop_assert!(progress.percent_complete < 100.0);
            }
            last = progress.percent_complete;
            last_step = progress.step_index;
        }

        prop_assert_eq!(engine.status(), SessionStatus::Completed);
        prop_assert_eq!(last, 100.0);
        prop_assert!(engine.tick().is_none());
    }

    #[test]
    fn pausing_never_changes_where_the_session_ends_up(
        pattern in valid_pattern(),
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let mut engine = SessionEngine::new();
        engine.start(&pattern).unwrap();

        let mut counted = 0u64;
        for op in ops {
            match op {
                Op::Tick => {
                    if engine.tick().is_some() {
                        counted += 1;
                    }
                }
                Op::Pause => {
                    engine.pause();
                }
                Op::Resume => {
                    engine.resume();
                }
            }
        }

        // Replay only the ticks that landed while running.
        let sequencer = PhaseSequencer::new(&pattern).unwrap();
        let mut expected = sequencer.initialize().with_status(SessionStatus::Running);
        for _ in 0..counted {
            expected = sequencer.advance(expected);
        }

        let state = engine.state();
        prop_assert_eq!(state.phase_index, expected.phase_index);
        prop_assert_eq!(state.cycle_index, expected.cycle_index);
        prop_assert_eq!(state.remaining_secs, expected.remaining_secs);
        prop_assert_eq!(engine.elapsed_secs(), counted);
    }

    #[test]
    fn all_zero_phases_are_rejected(
        len in 1usize..5,
        cycles in 0u32..4,
    ) {
        let mut engine = SessionEngine::new();
        let result = engine.start(&pattern(vec![0; len], cycles, 0));
        prop_assert!(result.is_err());
        prop_assert_eq!(engine.status(), SessionStatus::Idle);
    }
}
