use super::{strings, CompletionRule, Difficulty, PatternDefinition, PatternKind, PhaseSpec, ScriptScope};

#[allow(clippy::too_many_arguments)]
fn meditation(
    id: &str,
    name: &str,
    category: &str,
    minutes: u32,
    description: &str,
    benefits: &[&str],
    difficulty: Difficulty,
    script: &[&str],
) -> PatternDefinition {
    PatternDefinition {
        id: id.into(),
        name: name.into(),
        kind: PatternKind::Meditation,
        description: description.into(),
        category: category.into(),
        difficulty,
        phases: vec![PhaseSpec::new("meditate", minutes * 60)],
        cycles: 1,
        script: strings(script),
        script_scope: ScriptScope::Session,
        completion: CompletionRule::ScriptedDuration,
        benefits: strings(benefits),
        precautions: Vec::new(),
    }
}

pub(super) fn scripts() -> Vec<PatternDefinition> {
    vec![
        meditation(
            "progressive-relaxation",
            "Progressive Muscle Relaxation",
            "pain-relief",
            15,
            "Systematically tense and relax muscle groups to reduce physical tension and pain",
            &["Reduces muscle tension", "Decreases pain sensitivity", "Improves sleep quality"],
            Difficulty::Beginner,
            &[
                "Find a comfortable position and close your eyes.",
                "Start by tensing your toes for 5 seconds, then release.",
                "Notice the contrast between tension and relaxation.",
                "Move to your calves, tense for 5 seconds, then release.",
                "Continue with your thighs, feeling the relief as you let go.",
                "Tense your glutes and lower back, then release completely.",
                "Move to your abdomen, hold the tension, then release.",
                "Tense your hands into fists, hold, then let go.",
                "Tense your arms and shoulders, then release.",
                "Finally, tense your face and scalp, then release.",
                "Notice how your entire body feels relaxed and peaceful.",
                "Rest in this state of complete relaxation for a few minutes.",
            ],
        ),
        meditation(
            "body-scan",
            "Body Scan for Pain Relief",
            "body-scan",
            20,
            "A mindful journey through your body to identify and release areas of tension",
            &["Increases body awareness", "Reduces chronic pain", "Promotes healing"],
            Difficulty::Intermediate,
            &[
                "Lie down comfortably and close your eyes.",
                "Begin by focusing on your breath, natural and easy.",
                "Bring your attention to the top of your head.",
                "Notice any sensations without trying to change them.",
                "Slowly move your attention down to your forehead.",
                "Notice your eyes, cheeks, and jaw.",
                "Move to your neck and shoulders.",
                "Scan your arms from shoulders to fingertips.",
                "Bring attention to your chest and breathing.",
                "Notice your abdomen rising and falling.",
                "Scan your back from top to bottom.",
                "Move to your hips and pelvis.",
                "Scan your legs from hips to toes.",
                "End by sensing your whole body as one complete system.",
            ],
        ),
        meditation(
            "loving-kindness",
            "Loving-Kindness for Healing",
            "mindfulness",
            12,
            "Cultivate compassion for yourself and others while promoting inner healing",
            &["Reduces emotional pain", "Increases self-compassion", "Boosts immune system"],
            Difficulty::Beginner,
            &[
                "Sit comfortably and take three deep breaths.",
                "Place your hand on your heart and feel it beating.",
                "Repeat: \"May I be happy, may I be healthy, may I be at peace.\"",
                "Feel the warmth of these wishes for yourself.",
                "Now think of someone you love.",
                "Send them the same wishes: \"May you be happy, healthy, at peace.\"",
                "Expand to include a neutral person in your life.",
                "Send them loving wishes as well.",
                "Include someone you have difficulty with.",
                "Extend compassion even to them.",
                "Finally, include all beings everywhere.",
                "Rest in this feeling of universal love and connection.",
            ],
        ),
        meditation(
            "mountain",
            "Mountain Meditation",
            "mindfulness",
            18,
            "Embody the stability and strength of a mountain while facing pain",
            &["Builds resilience", "Develops equanimity", "Strengthens inner stability"],
            Difficulty::Advanced,
            &[
                "Sit with dignity and strength.",
                "Imagine yourself as a majestic mountain.",
                "Your base is broad and stable, deeply rooted.",
                "Your peak reaches toward the sky with grace.",
                "Weather may come and go around you.",
                "Storms, rain, snow, and sunshine.",
                "Through it all, you remain unmoved.",
                "Your essence is unchanging and strong.",
                "Pain may arise like passing weather.",
                "You acknowledge it without being disturbed.",
                "You are the mountain - stable, enduring, peaceful.",
                "Rest in this unshakeable presence.",
            ],
        ),
        meditation(
            "sleep-preparation",
            "Sleep Preparation",
            "sleep",
            25,
            "A gentle meditation to prepare your body and mind for restorative sleep",
            &["Improves sleep quality", "Reduces nighttime pain", "Calms racing thoughts"],
            Difficulty::Beginner,
            &[
                "Lie down in your bed and get comfortable.",
                "Let your body sink into the mattress.",
                "Take slow, deep breaths, releasing the day.",
                "Starting with your toes, let them become heavy.",
                "Feel the heaviness moving up through your legs.",
                "Your pelvis and abdomen become relaxed and heavy.",
                "Your chest softens with each exhale.",
                "Your arms become loose and heavy at your sides.",
                "Your shoulders drop and release all tension.",
                "Your neck and head sink into the pillow.",
                "Your face softens completely.",
                "You are safe, you are at peace.",
                "Let yourself drift into healing sleep.",
            ],
        ),
        meditation(
            "rain",
            "RAIN Technique for Pain",
            "pain-relief",
            10,
            "Recognition, Allowing, Investigation, and Non-attachment approach to pain",
            &["Changes relationship with pain", "Reduces suffering", "Increases acceptance"],
            Difficulty::Intermediate,
            &[
                "Sit comfortably and bring to mind your pain.",
                "Recognition: Notice what you're experiencing right now.",
                "Name it: \"This is pain,\" \"This is discomfort.\"",
                "Allowing: Stop fighting the sensations.",
                "Breathe and make space for what's here.",
                "Investigation: Explore with kindness.",
                "Where do you feel it in your body?",
                "What emotions arise with the pain?",
                "Non-attachment: This pain is not who you are.",
                "You are the awareness experiencing the pain.",
                "Rest in this spacious awareness.",
                "You are bigger than any pain or difficulty.",
            ],
        ),
    ]
}
