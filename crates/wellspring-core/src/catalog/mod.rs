//! Static catalog of guided sessions.
//!
//! Every breathing pattern, meditation script and exercise is described by a
//! [`PatternDefinition`]: an ordered list of timed phases repeated for a number
//! of cycles, plus optional instructional text. The catalog is built once and
//! never mutated.

mod breathing;
mod exercise;
mod meditation;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

pub use exercise::Routine;

/// Which self-care module a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Breathing,
    Meditation,
    Exercise,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Breathing => "breathing",
            PatternKind::Meditation => "meditation",
            PatternKind::Exercise => "exercise",
        }
    }
}

impl std::str::FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breathing" => Ok(PatternKind::Breathing),
            "meditation" => Ok(PatternKind::Meditation),
            "exercise" => Ok(PatternKind::Exercise),
            other => Err(format!("unknown pattern kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// How a finished or stopped session decides whether it counts as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRule {
    /// Completed only when every configured cycle ran to the end.
    Cycles,
    /// Completed once elapsed time reaches the recorder's threshold share of
    /// the scripted duration.
    ScriptedDuration,
}

/// What span of time the instructional script is spread across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptScope {
    /// One pass over the script for the whole session.
    Session,
    /// The script restarts with every cycle (exercise sets).
    Cycle,
}

/// A single timed phase of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub name: String,
    pub duration_secs: u32,
    /// Short text shown while the phase is active.
    #[serde(default)]
    pub cue: Option<String>,
}

impl PhaseSpec {
    pub fn new(name: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            cue: None,
        }
    }

    pub fn with_cue(mut self, cue: impl Into<String>) -> Self {
        self.cue = Some(cue.into());
        self
    }
}

/// Immutable definition of a guided session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub id: String,
    pub name: String,
    pub kind: PatternKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub difficulty: Difficulty,
    /// Ordered phases of one cycle. Zero-duration phases stay here but are
    /// skipped by the sequencer.
    pub phases: Vec<PhaseSpec>,
    pub cycles: u32,
    #[serde(default)]
    pub script: Vec<String>,
    pub script_scope: ScriptScope,
    pub completion: CompletionRule,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
}

impl PatternDefinition {
    /// Seconds in one pass over the phase list.
    pub fn cycle_duration_secs(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.duration_secs)).sum()
    }

    /// Seconds for the whole session, all cycles included.
    pub fn total_duration_secs(&self) -> u64 {
        self.cycle_duration_secs()
            .saturating_mul(u64::from(self.cycles))
    }
}

/// The built-in set of patterns and routines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    patterns: Vec<PatternDefinition>,
    routines: Vec<Routine>,
}

impl Catalog {
    /// Catalog with every built-in breathing pattern, meditation and exercise.
    pub fn builtin() -> Self {
        let mut patterns = breathing::patterns();
        patterns.extend(meditation::scripts());
        patterns.extend(exercise::exercises());
        Self {
            patterns,
            routines: exercise::routines(),
        }
    }

    pub fn patterns(&self) -> &[PatternDefinition] {
        &self.patterns
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn get(&self, id: &str) -> Option<&PatternDefinition> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn get_routine(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    pub fn by_kind(&self, kind: PatternKind) -> impl Iterator<Item = &PatternDefinition> {
        self.patterns.iter().filter(move |p| p.kind == kind)
    }

    /// Patterns in `category`. `"all"` matches everything.
    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a PatternDefinition> + 'a {
        self.patterns
            .iter()
            .filter(move |p| category == "all" || p.category == category)
    }

    /// Resolve a pattern id or a routine id into something the engine can run.
    pub fn resolve(&self, id: &str) -> Result<PatternDefinition, SessionError> {
        if let Some(pattern) = self.get(id) {
            return Ok(pattern.clone());
        }
        self.routine_pattern(id)
    }

    /// Build a single-cycle pattern that runs each exercise of a routine back to
    /// back, one phase per exercise covering all of its sets.
    pub fn routine_pattern(&self, routine_id: &str) -> Result<PatternDefinition, SessionError> {
        let routine = self
            .get_routine(routine_id)
            .ok_or_else(|| SessionError::UnknownPattern(routine_id.to_string()))?;

        let mut phases = Vec::with_capacity(routine.exercises.len());
        for exercise_id in &routine.exercises {
            let exercise = self
                .get(exercise_id)
                .ok_or_else(|| SessionError::UnknownPattern(exercise_id.clone()))?;
            let secs = exercise
                .cycle_duration_secs()
                .saturating_mul(u64::from(exercise.cycles));
            let secs = u32::try_from(secs).unwrap_or(u32::MAX);
            phases.push(PhaseSpec::new(exercise.name.clone(), secs).with_cue(exercise.description.clone()));
        }

        Ok(PatternDefinition {
            id: routine.id.clone(),
            name: routine.name.clone(),
            kind: PatternKind::Exercise,
            description: routine.description.clone(),
            category: routine.category.clone(),
            difficulty: routine.difficulty,
            phases,
            cycles: 1,
            script: Vec::new(),
            script_scope: ScriptScope::Session,
            completion: CompletionRule::Cycles,
            benefits: routine.benefits.clone(),
            precautions: Vec::new(),
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
