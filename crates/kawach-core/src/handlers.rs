//! Run-level workflows shared by the CLI and the MCP server.
//!
//! ```text
//! Interface -> Arena -> Handlers -> Engines + ProgressStore
//! ```
//!
//! - [`play_scenario`] drives a branching drill with a list of answers
//! - [`run_timed_script`] drives the timed drill on a virtual clock
//! - [`settle_run`] writes a completed run into a progress store
//!
//! Playthroughs use a [`ManualClock`], so they complete instantly while the
//! engines still see the configured delays.

use std::time::Duration;

use log::{debug, info};

use crate::{
    clock::ManualClock,
    engine::{
        AvailableDevice, DrillPhase, HoldStage, ScenarioEngine, ScenarioEvent, TimedDrill,
        TimedDrillEvent, UnavailableDevice,
    },
    error::{KawachError, Result},
    models::{
        ResultsSummary, RunResult, ScenarioDefinition, ScenarioEngineConfig, Settlement,
        TimedDrillConfig, TimedDrillResult,
    },
    progress::ProgressStore,
};

/// Time spent away from cover when a script releases during the countdown.
const RELEASE_PAUSE: Duration = Duration::from_secs(1);

/// Time into the hold stage at which a scripted hazard tap happens.
const HAZARD_TAP_OFFSET: Duration = Duration::from_secs(1);

/// Longest reaction or evacuation a script may ask for, in seconds.
pub const MAX_SCRIPT_SECS: f64 = 3_600.0;

/// Completed branching run and the notifications it produced.
#[derive(Debug, Clone)]
pub struct ScenarioPlaythrough {
    pub summary: ResultsSummary,
    pub events: Vec<ScenarioEvent>,
}

/// Plays `scenario` to completion, answering step `i` with `answers[i]`.
///
/// # Errors
///
/// Returns `KawachError::InvalidScenario` for a malformed scenario and
/// `KawachError::InvalidInput` if the answers do not cover every step or name
/// an option that does not exist.
pub fn play_scenario(
    scenario: &ScenarioDefinition,
    config: &ScenarioEngineConfig,
    answers: &[usize],
) -> Result<ScenarioPlaythrough> {
    scenario.validate()?;
    config.validate()?;

    if answers.len() != scenario.steps.len() {
        return Err(KawachError::invalid_input("answers").with_reason(format!(
            "expected {} answers, got {}",
            scenario.steps.len(),
            answers.len()
        )));
    }
    for (index, (step, &answer)) in scenario.steps.iter().zip(answers).enumerate() {
        if answer >= step.options.len() {
            return Err(KawachError::invalid_input("answers").with_reason(format!(
                "step {} has {} options, got option {answer}",
                index + 1,
                step.options.len()
            )));
        }
    }

    let clock = ManualClock::new();
    let mut engine = ScenarioEngine::new(clock.clone(), config.clone());
    engine.start(scenario.clone())?;

    for &answer in answers {
        engine.select_option(answer);
        clock.advance(config.advance_delay());
        engine.poll();
    }

    let summary = engine.results_summary()?.clone();
    Ok(ScenarioPlaythrough {
        summary,
        events: engine.take_events(),
    })
}

/// Scripted learner behaviour for a timed drill.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedDrillScript {
    /// Seconds after the shaking starts at which the learner takes cover.
    /// Cover taken while still shaking counts once the shaking ends.
    pub reaction_secs: f64,
    /// Seconds between the end of the countdown and the evacuation
    pub evacuation_secs: f64,
    /// Countdown value at which the learner briefly leaves cover
    pub release_at_countdown: Option<u32>,
    /// Hazards tapped during the hold stage, in order
    pub hazard_taps: Vec<String>,
    /// Whether the input device can be acquired
    pub device_available: bool,
}

impl Default for TimedDrillScript {
    fn default() -> Self {
        Self {
            reaction_secs: 1.0,
            evacuation_secs: 2.0,
            release_at_countdown: None,
            hazard_taps: Vec::new(),
            device_available: true,
        }
    }
}

impl TimedDrillScript {
    fn validate(&self, config: &TimedDrillConfig) -> Result<()> {
        script_duration("reaction_secs", self.reaction_secs)?;
        script_duration("evacuation_secs", self.evacuation_secs)?;
        if let Some(at) = self.release_at_countdown {
            if at == 0 || at > config.countdown_start {
                return Err(KawachError::invalid_input("release_at_countdown").with_reason(
                    format!("must be between 1 and {}", config.countdown_start),
                ));
            }
        }
        Ok(())
    }
}

/// Converts a scripted timing to a `Duration`, bounded by [`MAX_SCRIPT_SECS`].
fn script_duration(field: &str, secs: f64) -> Result<Duration> {
    if !(0.0..=MAX_SCRIPT_SECS).contains(&secs) {
        return Err(KawachError::invalid_input(field).with_reason(format!(
            "must be between 0 and {MAX_SCRIPT_SECS} seconds"
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| KawachError::invalid_input(field).with_reason(e.to_string()))
}

/// Final state of a scripted timed drill.
#[derive(Debug, Clone)]
pub struct TimedPlaythrough {
    pub phase: DrillPhase,
    /// None when the drill ended in `DeviceError`
    pub result: Option<TimedDrillResult>,
    pub events: Vec<TimedDrillEvent>,
}

/// Runs the timed drill against `script` on a virtual clock.
///
/// # Errors
///
/// Returns `KawachError::InvalidInput` for a malformed config or script.
pub fn run_timed_script(
    config: &TimedDrillConfig,
    script: &TimedDrillScript,
) -> Result<TimedPlaythrough> {
    config.validate()?;
    script.validate(config)?;

    let clock = ManualClock::new();
    let mut drill = TimedDrill::new(clock.clone(), config.clone());

    let phase = if script.device_available {
        drill.start(&mut AvailableDevice)?
    } else {
        drill.start(&mut UnavailableDevice {
            reason: "no input device available".to_string(),
        })?
    };
    if phase == DrillPhase::DeviceError {
        return Ok(TimedPlaythrough {
            phase,
            result: None,
            events: drill.take_events(),
        });
    }

    clock.set(script_duration("reaction_secs", script.reaction_secs)?);
    drill.on_hold_changed(true);
    run_until(&clock, &mut drill, |d| d.phase() == DrillPhase::HoldingCover)?;

    for hazard in &script.hazard_taps {
        clock.advance(HAZARD_TAP_OFFSET);
        drill.poll();
        if drill.hold_stage() != Some(HoldStage::Hold) {
            debug!("Skipping hazard tap '{hazard}': hold stage is over");
            break;
        }
        drill.tap_hazard(hazard);
        drill.on_hold_changed(true);
    }

    if let Some(at) = script.release_at_countdown {
        run_until(&clock, &mut drill, |d| {
            d.hold_stage() == Some(HoldStage::Countdown) && d.countdown_remaining() <= at
        })?;
        drill.on_hold_changed(false);
        clock.advance(RELEASE_PAUSE);
        drill.on_hold_changed(true);
    }

    run_until(&clock, &mut drill, |d| d.phase() == DrillPhase::Evacuating)?;
    clock.advance(script_duration("evacuation_secs", script.evacuation_secs)?);
    drill.evacuate();

    Ok(TimedPlaythrough {
        phase: drill.phase(),
        result: drill.result().cloned(),
        events: drill.take_events(),
    })
}

/// Jumps the clock from timer to timer until `done` holds.
fn run_until(
    clock: &ManualClock,
    drill: &mut TimedDrill<ManualClock>,
    done: impl Fn(&TimedDrill<ManualClock>) -> bool,
) -> Result<()> {
    while !done(drill) {
        let Some(due) = drill.next_due() else {
            return Err(KawachError::Configuration {
                message: format!("Timed drill stalled in phase {}", drill.phase().as_str()),
            });
        };
        clock.set(due);
        drill.poll();
    }
    Ok(())
}

/// Writes a completed run into the progress store.
///
/// Without an assignment the XP is always credited. With one, the XP is
/// credited and the assignment marked completed in one step of the store,
/// unless the learner already completed it, in which case nothing is written.
///
/// # Errors
///
/// Returns `KawachError::InvalidInput` for an empty user ID, or whatever the
/// store reports.
pub fn settle_run<S: ProgressStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    assignment_id: Option<&str>,
    result: &RunResult,
) -> Result<Settlement> {
    if user_id.trim().is_empty() {
        return Err(KawachError::invalid_input("user_id").with_reason("must not be empty"));
    }

    let Some(progress) = store.settle(user_id, assignment_id, result.awarded_xp)? else {
        info!("'{user_id}' already completed assignment {assignment_id:?}; no XP credited");
        return Ok(Settlement {
            user_id: user_id.to_string(),
            assignment_id: assignment_id.map(String::from),
            credited_xp: 0,
            already_completed: true,
            progress: store.progress(user_id)?,
        });
    };
    info!(
        "Credited {} XP to '{user_id}' (total {}, level {})",
        result.awarded_xp, progress.xp, progress.level
    );

    Ok(Settlement {
        user_id: user_id.to_string(),
        assignment_id: assignment_id.map(String::from),
        credited_xp: result.awarded_xp,
        already_completed: false,
        progress,
    })
}
