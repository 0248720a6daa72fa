//! Outcomes produced by completed drill runs.

use serde::{Deserialize, Serialize};

use crate::models::Settlement;

/// Result object handed to the shell exactly once per completed run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evacuation_secs: Option<f64>,
    pub awarded_xp: u32,
}

/// Correctness record for one answered step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepOutcome {
    /// 0-indexed position of the step
    pub step_index: usize,
    /// 0-indexed option the learner chose
    pub selected_option: usize,
    pub correct: bool,
    /// Points this step contributed to the score
    pub points: u32,
}

/// Final summary of a branching scenario run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsSummary {
    pub scenario_id: String,
    pub title: String,
    pub score: u32,
    pub max_score: u32,
    pub outcomes: Vec<StepOutcome>,
}

impl ResultsSummary {
    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.correct).count()
    }

    pub fn total_steps(&self) -> usize {
        self.outcomes.len()
    }

    /// Branching drills award their score as XP.
    pub fn run_result(&self) -> RunResult {
        RunResult {
            score: self.score,
            reaction_secs: None,
            evacuation_secs: None,
            awarded_xp: self.score,
        }
    }
}

/// Qualitative label for a single timing metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    CouldBeFaster,
}

impl Rating {
    /// Points used when combining two ratings into a [`Verdict`].
    pub fn points(&self) -> u8 {
        match self {
            Rating::Excellent => 2,
            Rating::Good => 1,
            Rating::CouldBeFaster => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent!",
            Rating::Good => "Good",
            Rating::CouldBeFaster => "Could be faster",
        }
    }
}

/// Overall feedback for a timed drill, combining both ratings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Excellent => {
                "Excellent reaction and a swift evacuation. You're a safety pro!"
            }
            Verdict::Good => "Good job! Quick reactions and a safe evacuation.",
            Verdict::NeedsImprovement => {
                "Good effort! Try to react and evacuate a little faster next time."
            }
        }
    }
}

/// XP split by scoring component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct XpBreakdown {
    pub reaction: u32,
    pub cover: u32,
    pub evacuation: u32,
}

impl XpBreakdown {
    pub fn total(&self) -> u32 {
        self.reaction
            .saturating_add(self.cover)
            .saturating_add(self.evacuation)
    }
}

/// Metrics and reward of a completed timed drill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimedDrillResult {
    pub reaction_secs: f64,
    pub evacuation_secs: f64,
    pub reaction_rating: Rating,
    pub evacuation_rating: Rating,
    pub verdict: Verdict,
    pub xp: XpBreakdown,
    pub awarded_xp: u32,
}

impl TimedDrillResult {
    /// The timed drill has no separate score; the awarded XP stands in.
    pub fn run_result(&self) -> RunResult {
        RunResult {
            score: self.awarded_xp,
            reaction_secs: Some(self.reaction_secs),
            evacuation_secs: Some(self.evacuation_secs),
            awarded_xp: self.awarded_xp,
        }
    }
}

/// Outcome of a branching drill played through an interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioRunReport {
    pub summary: ResultsSummary,
    /// Feedback shown for each answered step, in order
    pub feedback: Vec<String>,
    /// What was written to the progress store, if a learner was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<Settlement>,
}

/// Outcome of a scripted timed drill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimedRunReport {
    /// Set when the input device could not be acquired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TimedDrillResult>,
    /// Tips shown for tapped hazards
    #[serde(default)]
    pub hazard_warnings: Vec<String>,
    /// Times the countdown was reset because cover was lost
    pub countdown_resets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement: Option<Settlement>,
}
