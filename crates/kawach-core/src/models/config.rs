//! Tunable drill parameters.
//!
//! All durations are stored as milliseconds so that partial JSON overrides
//! stay readable. Every struct defaults to the values used by the school
//! drills, and every field carries `#[serde(default)]` through its parent so
//! a config file only needs to mention what it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KawachError, Result};

/// Settings for both drill engines, as loaded from a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub scenario: ScenarioEngineConfig,
    pub timed: TimedDrillConfig,
}

impl EngineSettings {
    /// Validates both engine configurations.
    pub fn validate(&self) -> Result<()> {
        self.scenario.validate()?;
        self.timed.validate()
    }
}

/// Pacing of the branching scenario engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioEngineConfig {
    /// Delay between a selection and the automatic advance, so the learner
    /// can read the feedback
    pub advance_delay_ms: u64,
}

impl Default for ScenarioEngineConfig {
    fn default() -> Self {
        Self {
            advance_delay_ms: 4_000,
        }
    }
}

impl ScenarioEngineConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.advance_delay_ms == 0 {
            return Err(KawachError::invalid_input("scenario.advance_delay_ms")
                .with_reason("must be greater than zero"));
        }
        Ok(())
    }
}

/// A distractor hot-zone shown while the learner holds cover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hazard {
    pub id: String,
    pub label: String,
    /// Safety tip surfaced when the hazard is tapped
    pub tip: String,
}

/// Timing, scoring and hazards of the drop-cover-hold-evacuate drill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimedDrillConfig {
    /// How long the simulated shaking lasts before cover is expected
    pub shake_duration_ms: u64,
    /// How long cover must be held before the countdown begins
    pub hold_duration_ms: u64,
    /// Countdown start value, in ticks
    pub countdown_start: u32,
    /// Interval between countdown ticks
    pub countdown_interval_ms: u64,
    pub scoring: ScoringConfig,
    pub reaction_thresholds: RatingThresholds,
    pub evacuation_thresholds: RatingThresholds,
    pub hazards: Vec<Hazard>,
}

impl Default for TimedDrillConfig {
    fn default() -> Self {
        Self {
            shake_duration_ms: 2_000,
            hold_duration_ms: 3_000,
            countdown_start: 10,
            countdown_interval_ms: 1_000,
            scoring: ScoringConfig::default(),
            reaction_thresholds: RatingThresholds {
                excellent_secs: 2.5,
                good_secs: 4.0,
            },
            evacuation_thresholds: RatingThresholds {
                excellent_secs: 5.0,
                good_secs: 8.0,
            },
            hazards: vec![
                Hazard {
                    id: "window".to_string(),
                    label: "Window".to_string(),
                    tip: "Glass can shatter during an earthquake. Stay clear!".to_string(),
                },
                Hazard {
                    id: "shelf".to_string(),
                    label: "Bookshelf".to_string(),
                    tip: "Heavy objects can fall from shelves. Keep your distance.".to_string(),
                },
            ],
        }
    }
}

impl TimedDrillConfig {
    pub fn shake_duration(&self) -> Duration {
        Duration::from_millis(self.shake_duration_ms)
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_duration_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    /// Looks up a hazard by ID.
    pub fn hazard(&self, id: &str) -> Option<&Hazard> {
        self.hazards.iter().find(|hazard| hazard.id == id)
    }

    /// Checks that every phase has a positive duration and that thresholds
    /// are ordered.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("timed.shake_duration_ms", self.shake_duration_ms),
            ("timed.hold_duration_ms", self.hold_duration_ms),
            ("timed.countdown_interval_ms", self.countdown_interval_ms),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(
                    KawachError::invalid_input(field).with_reason("must be greater than zero")
                );
            }
        }
        if self.countdown_start == 0 {
            return Err(KawachError::invalid_input("timed.countdown_start")
                .with_reason("must be greater than zero"));
        }
        self.scoring.validate()?;
        self.reaction_thresholds.validate("timed.reaction_thresholds")?;
        self.evacuation_thresholds.validate("timed.evacuation_thresholds")
    }
}

/// Constants of the XP formula.
///
/// Each timed component is `max(min_component, base - floor(penalty * secs))`;
/// the cover component is a flat award for holding cover to the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub reaction_base: u32,
    pub reaction_penalty_per_sec: f64,
    pub cover_award: u32,
    pub evacuation_base: u32,
    pub evacuation_penalty_per_sec: f64,
    pub min_component: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reaction_base: 50,
            reaction_penalty_per_sec: 10.0,
            cover_award: 50,
            evacuation_base: 50,
            evacuation_penalty_per_sec: 5.0,
            min_component: 10,
        }
    }
}

impl ScoringConfig {
    /// Highest XP a single run can earn, or None if it overflows `u32`.
    pub fn max_award(&self) -> Option<u32> {
        self.reaction_base
            .max(self.min_component)
            .checked_add(self.cover_award)?
            .checked_add(self.evacuation_base.max(self.min_component))
    }

    /// Checks that penalties are non-negative and the largest award fits.
    pub fn validate(&self) -> Result<()> {
        let penalties = [
            ("timed.scoring.reaction_penalty_per_sec", self.reaction_penalty_per_sec),
            ("timed.scoring.evacuation_penalty_per_sec", self.evacuation_penalty_per_sec),
        ];
        for (field, value) in penalties {
            if !value.is_finite() || value < 0.0 {
                return Err(KawachError::invalid_input(field)
                    .with_reason("must be a non-negative number"));
            }
        }
        if self.max_award().is_none() {
            return Err(KawachError::invalid_input("timed.scoring")
                .with_reason(format!("maximum award exceeds {}", u32::MAX)));
        }
        Ok(())
    }
}

/// Upper bounds (inclusive, in seconds) for the qualitative ratings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingThresholds {
    pub excellent_secs: f64,
    pub good_secs: f64,
}

impl RatingThresholds {
    fn validate(&self, field: &str) -> Result<()> {
        if !(self.excellent_secs > 0.0 && self.excellent_secs <= self.good_secs) {
            return Err(KawachError::invalid_input(field)
                .with_reason("expected 0 < excellent_secs <= good_secs"));
        }
        Ok(())
    }
}
