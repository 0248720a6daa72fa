//! Scenario definitions for the branching drill.

use serde::{Deserialize, Serialize};

use crate::error::{KawachError, Result};

/// Default points awarded for each correctly answered step.
pub const DEFAULT_REWARD_PER_STEP: u32 = 25;

fn default_reward_per_step() -> u32 {
    DEFAULT_REWARD_PER_STEP
}

/// An authored, immutable sequence of decision points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDefinition {
    /// Unique identifier of the scenario
    pub id: String,

    /// Display title
    pub title: String,

    /// Short description shown before the run starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Points added to the score for each correct answer
    #[serde(default = "default_reward_per_step")]
    pub reward_per_step: u32,

    /// Steps, presented strictly in order
    pub steps: Vec<Step>,
}

/// One decision point within a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Situation presented to the learner
    pub situation: String,

    /// Optional image reference (URL or asset path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Available choices, in display order
    pub options: Vec<ScenarioOption>,
}

/// A selectable answer for a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioOption {
    /// Label of the option
    pub text: String,

    /// Whether this is the correct choice for its step
    #[serde(default)]
    pub is_correct: bool,

    /// Feedback shown after selection, correct or not
    pub feedback: String,
}

impl Step {
    /// Index of the correct option, if exactly one is marked correct.
    pub fn correct_option(&self) -> Option<usize> {
        let mut correct = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_correct)
            .map(|(index, _)| index);
        match (correct.next(), correct.next()) {
            (Some(index), None) => Some(index),
            _ => None,
        }
    }
}

impl ScenarioDefinition {
    /// Highest score a run of this scenario can reach.
    ///
    /// Saturates at `u32::MAX`; [`Self::validate`] rejects scenarios whose
    /// maximum does not fit.
    pub fn max_score(&self) -> u32 {
        self.checked_max_score().unwrap_or(u32::MAX)
    }

    fn checked_max_score(&self) -> Option<u32> {
        u32::try_from(self.steps.len())
            .ok()
            .and_then(|steps| self.reward_per_step.checked_mul(steps))
    }

    /// Checks the authoring contract a run relies on.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidScenario` when the scenario has no steps,
    /// a step has no options, a step does not have exactly one correct option,
    /// the per-step reward is zero, or the maximum score overflows `u32`.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(KawachError::invalid_scenario(
                &self.id,
                "scenario id must not be empty",
            ));
        }
        if self.steps.is_empty() {
            return Err(KawachError::invalid_scenario(
                &self.id,
                "scenario has no steps",
            ));
        }
        if self.reward_per_step == 0 {
            return Err(KawachError::invalid_scenario(
                &self.id,
                "reward per step must be greater than zero",
            ));
        }
        if self.checked_max_score().is_none() {
            return Err(KawachError::invalid_scenario(
                &self.id,
                format!(
                    "reward per step {} over {} steps exceeds the maximum score of {}",
                    self.reward_per_step,
                    self.steps.len(),
                    u32::MAX
                ),
            ));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.options.is_empty() {
                return Err(KawachError::invalid_scenario(
                    &self.id,
                    format!("step {} has no options", index + 1),
                ));
            }
            let correct = step.options.iter().filter(|o| o.is_correct).count();
            if correct != 1 {
                return Err(KawachError::invalid_scenario(
                    &self.id,
                    format!(
                        "step {} must have exactly one correct option, found {correct}",
                        index + 1
                    ),
                ));
            }
        }

        Ok(())
    }
}
