use super::{strings, CompletionRule, Difficulty, PatternDefinition, PatternKind, PhaseSpec, ScriptScope};

/// Seconds for each of the four breathing phases, in order.
struct Timing {
    inhale: u32,
    hold: u32,
    exhale: u32,
    rest: u32,
}

fn breathing(
    id: &str,
    name: &str,
    description: &str,
    timing: Timing,
    cycles: u32,
    benefits: &[&str],
    difficulty: Difficulty,
) -> PatternDefinition {
    PatternDefinition {
        id: id.into(),
        name: name.into(),
        kind: PatternKind::Breathing,
        description: description.into(),
        category: "breathing".into(),
        difficulty,
        phases: vec![
            PhaseSpec::new("inhale", timing.inhale).with_cue("Breathe In"),
            PhaseSpec::new("hold", timing.hold).with_cue("Hold"),
            PhaseSpec::new("exhale", timing.exhale).with_cue("Breathe Out"),
            PhaseSpec::new("rest", timing.rest).with_cue("Rest"),
        ],
        cycles,
        script: Vec::new(),
        script_scope: ScriptScope::Session,
        completion: CompletionRule::Cycles,
        benefits: strings(benefits),
        precautions: Vec::new(),
    }
}

pub(super) fn patterns() -> Vec<PatternDefinition> {
    vec![
        breathing(
            "box",
            "Box Breathing",
            "Equal timing for all phases, great for stress relief",
            Timing { inhale: 4, hold: 4, exhale: 4, rest: 4 },
            8,
            &["Reduces stress", "Improves focus", "Calms nervous system"],
            Difficulty::Beginner,
        ),
        breathing(
            "478",
            "4-7-8 Breathing",
            "Dr. Weil's relaxing breath technique",
            Timing { inhale: 4, hold: 7, exhale: 8, rest: 0 },
            6,
            &["Promotes sleep", "Reduces anxiety", "Pain relief"],
            Difficulty::Intermediate,
        ),
        breathing(
            "coherent",
            "Coherent Breathing",
            "5-second breathing for heart rate variability",
            Timing { inhale: 5, hold: 0, exhale: 5, rest: 0 },
            12,
            &["Heart coherence", "Emotional balance", "Stress reduction"],
            Difficulty::Beginner,
        ),
        breathing(
            "extended",
            "Extended Exhale",
            "Longer exhale activates parasympathetic nervous system",
            Timing { inhale: 4, hold: 2, exhale: 8, rest: 0 },
            10,
            &["Deep relaxation", "Pain management", "Better sleep"],
            Difficulty::Intermediate,
        ),
        breathing(
            "triangle",
            "Triangle Breathing",
            "Three-phase breathing without holds",
            Timing { inhale: 6, hold: 0, exhale: 6, rest: 6 },
            8,
            &["Mental clarity", "Grounding", "Anxiety relief"],
            Difficulty::Advanced,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_seven_eight_keeps_zero_rest_in_definition() {
        let p = patterns().into_iter().find(|p| p.id == "478").unwrap();
        assert_eq!(p.phases.len(), 4);
        assert_eq!(p.phases[3].duration_secs, 0);
        assert_eq!(p.cycle_duration_secs(), 19);
    }

    #[test]
    fn phases_carry_cues() {
        let p = &patterns()[0];
        assert_eq!(p.phases[0].cue.as_deref(), Some("Breathe In"));
        assert_eq!(p.phases[2].cue.as_deref(), Some("Breathe Out"));
    }
}
