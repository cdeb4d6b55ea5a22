use serde::{Deserialize, Serialize};

use super::{strings, CompletionRule, Difficulty, PatternDefinition, PatternKind, PhaseSpec, ScriptScope};

/// An ordered group of exercises run as one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// Exercise pattern ids, in running order.
    pub exercises: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

struct Exercise<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    category: &'a str,
    difficulty: Difficulty,
    /// Seconds per set.
    set_secs: u32,
    sets: u32,
    instructions: &'a [&'a str],
    benefits: &'a [&'a str],
    precautions: &'a [&'a str],
}

impl Exercise<'_> {
    fn into_pattern(self) -> PatternDefinition {
        PatternDefinition {
            id: self.id.into(),
            name: self.name.into(),
            kind: PatternKind::Exercise,
            description: self.description.into(),
            category: self.category.into(),
            difficulty: self.difficulty,
            phases: vec![PhaseSpec::new("work", self.set_secs).with_cue("Move")],
            cycles: self.sets.max(1),
            script: strings(self.instructions),
            script_scope: ScriptScope::Cycle,
            completion: CompletionRule::Cycles,
            benefits: strings(self.benefits),
            precautions: strings(self.precautions),
        }
    }
}

pub(super) fn exercises() -> Vec<PatternDefinition> {
    [
        Exercise {
            id: "neck-roll",
            name: "Neck Roll",
            description: "Gentle neck rotations to relieve tension and improve mobility",
            category: "neck",
            difficulty: Difficulty::Beginner,
            set_secs: 60,
            sets: 2,
            instructions: &[
                "Sit or stand with your spine straight",
                "Slowly drop your right ear toward your right shoulder",
                "Gently roll your head forward, chin to chest",
                "Continue rolling to the left side",
                "Complete the circle by rolling back to the starting position",
                "Reverse direction for the next set",
            ],
            benefits: &["Reduces neck tension", "Improves flexibility", "Relieves headaches"],
            precautions: &["Move slowly", "Stop if you feel dizzy", "Avoid if you have neck injuries"],
        },
        Exercise {
            id: "cat-cow",
            name: "Cat-Cow Stretch",
            description: "Spinal mobility exercise that helps with back pain and stiffness",
            category: "back",
            difficulty: Difficulty::Beginner,
            set_secs: 90,
            sets: 2,
            instructions: &[
                "Start on hands and knees in a tabletop position",
                "Arch your back, lifting your chest and tailbone (Cow pose)",
                "Hold for 2-3 seconds",
                "Round your spine toward the ceiling, tucking chin to chest (Cat pose)",
                "Hold for 2-3 seconds",
                "Flow smoothly between the two positions",
            ],
            benefits: &["Improves spinal flexibility", "Reduces back pain", "Strengthens core"],
            precautions: &["Move gently", "Support wrists if needed", "Avoid if pregnant without approval"],
        },
        Exercise {
            id: "hip-flexor-stretch",
            name: "Hip Flexor Stretch",
            description: "Deep stretch to relieve tight hip flexors and lower back tension",
            category: "legs",
            difficulty: Difficulty::Intermediate,
            set_secs: 120,
            sets: 2,
            instructions: &[
                "Start in a lunge position with right foot forward",
                "Lower your left knee to the ground",
                "Keep your right knee directly over your ankle",
                "Gently push your hips forward and down",
                "You should feel a stretch in the front of your left hip",
                "Hold the position and breathe deeply",
                "Switch sides and repeat",
            ],
            benefits: &["Relieves hip tightness", "Reduces lower back pain", "Improves posture"],
            precautions: &["Use a pillow under knee if needed", "Don't force the stretch", "Stop if sharp pain occurs"],
        },
        Exercise {
            id: "bird-dog",
            name: "Bird Dog",
            description: "Core strengthening exercise that improves stability and reduces back pain",
            category: "core",
            difficulty: Difficulty::Intermediate,
            set_secs: 30,
            sets: 3,
            instructions: &[
                "Start in tabletop position on hands and knees",
                "Extend your right arm forward and left leg back",
                "Keep your hips level and spine neutral",
                "Hold for 5-10 seconds",
                "Return to starting position slowly",
                "Switch to left arm and right leg",
                "Focus on maintaining balance and control",
            ],
            benefits: &["Strengthens core", "Improves balance", "Reduces back pain"],
            precautions: &["Keep movements controlled", "Don't arch your back", "Start with shorter holds"],
        },
        Exercise {
            id: "spinal-twist",
            name: "Gentle Spinal Twist",
            description: "Seated twist to improve spinal mobility and reduce tension",
            category: "back",
            difficulty: Difficulty::Beginner,
            set_secs: 60,
            sets: 2,
            instructions: &[
                "Sit tall in a chair with feet flat on floor",
                "Place your right hand on the back of the chair",
                "Place your left hand on your right knee",
                "Gently rotate your torso to the right",
                "Keep your shoulders relaxed",
                "Hold and breathe deeply",
                "Return to center and repeat on the other side",
            ],
            benefits: &["Improves spinal mobility", "Reduces tension", "Aids digestion"],
            precautions: &["Move slowly", "Don't force the twist", "Stop if you feel pain"],
        },
        Exercise {
            id: "wall-push-up",
            name: "Wall Push-Up",
            description: "Modified push-up to strengthen arms and chest without strain",
            category: "full-body",
            difficulty: Difficulty::Beginner,
            set_secs: 45,
            sets: 2,
            instructions: &[
                "Stand arm's length from a wall",
                "Place palms flat against the wall at shoulder height",
                "Keep your body in a straight line",
                "Slowly bend your elbows and lean toward the wall",
                "Push back to starting position",
                "Keep your core engaged throughout",
            ],
            benefits: &["Strengthens upper body", "Improves posture", "Low impact"],
            precautions: &["Start slowly", "Keep wrists comfortable", "Stop if shoulder pain occurs"],
        },
    ]
    .into_iter()
    .map(Exercise::into_pattern)
    .collect()
}

pub(super) fn routines() -> Vec<Routine> {
    vec![
        Routine {
            id: "morning-mobility".into(),
            name: "Morning Mobility".into(),
            description: "Gentle routine to start your day with improved flexibility".into(),
            category: "stretching".into(),
            difficulty: Difficulty::Beginner,
            exercises: strings(&["neck-roll", "cat-cow", "spinal-twist"]),
            benefits: strings(&["Increases mobility", "Reduces morning stiffness", "Energizes body"]),
        },
        Routine {
            id: "lower-back-relief".into(),
            name: "Lower Back Relief".into(),
            description: "Targeted exercises for lower back pain and tension".into(),
            category: "back".into(),
            difficulty: Difficulty::Intermediate,
            exercises: strings(&["cat-cow", "hip-flexor-stretch", "bird-dog"]),
            benefits: strings(&["Reduces back pain", "Strengthens core", "Improves posture"]),
        },
        Routine {
            id: "office-break".into(),
            name: "Office Break Routine".into(),
            description: "Quick exercises you can do at work to combat sitting pain".into(),
            category: "neck".into(),
            difficulty: Difficulty::Beginner,
            exercises: strings(&["neck-roll", "spinal-twist"]),
            benefits: strings(&["Relieves neck tension", "Improves circulation", "Reduces stress"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_become_cycles() {
        let bird_dog = exercises().into_iter().find(|p| p.id == "bird-dog").unwrap();
        assert_eq!(bird_dog.cycles, 3);
        assert_eq!(bird_dog.total_duration_secs(), 90);
        assert_eq!(bird_dog.script_scope, ScriptScope::Cycle);
    }
}
