//! Scenario lookup and drill runs for the Arena.

use log::info;

use super::Arena;
use crate::{
    db::Database,
    display::Scenarios,
    engine::{ScenarioEvent, TimedDrillEvent},
    error::{KawachError, Result},
    handlers::{self, TimedDrillScript},
    models::{
        AssignmentKind, RunResult, ScenarioDefinition, ScenarioRunReport, Settlement,
        TimedRunReport, AR_DRILL_CONTENT_ID,
    },
    params::{PlayScenario, RunArDrill, ScenarioId},
};

impl Arena {
    /// All scenarios in the catalogue, ordered by ID.
    pub fn list_scenarios(&self) -> Scenarios {
        Scenarios(self.content.list().into_iter().cloned().collect())
    }

    /// Looks up a scenario.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::ScenarioNotFound` for an unknown ID.
    pub fn show_scenario(&self, params: &ScenarioId) -> Result<ScenarioDefinition> {
        self.content.require(&params.id).cloned()
    }

    /// Plays a branching drill with the given answers and, when a learner is
    /// given, settles the result.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::ScenarioNotFound` for an unknown scenario,
    /// `KawachError::InvalidInput` for bad answers or an assignment without a
    /// learner, and `KawachError::AssignmentNotFound` for an unknown
    /// assignment.
    pub async fn play_scenario(&self, params: &PlayScenario) -> Result<ScenarioRunReport> {
        let scenario = self.content.require(&params.scenario_id)?.clone();
        let config = self.settings.scenario.clone();
        let answers = params.answers.clone();
        let user_id = params.user_id.clone();
        let assignment_id = params.assignment_id.clone();

        self.with_database(move |db| {
            let settle_to = settlement_target(
                db,
                user_id.as_deref(),
                assignment_id.as_deref(),
                AssignmentKind::Drill,
                &scenario.id,
            )?;

            let run = handlers::play_scenario(&scenario, &config, &answers)?;
            info!(
                "Played '{}': {}/{}",
                scenario.id, run.summary.score, run.summary.max_score
            );

            let feedback = run
                .events
                .iter()
                .filter_map(|event| match event {
                    ScenarioEvent::OptionSelected { feedback, .. } => Some(feedback.clone()),
                    _ => None,
                })
                .collect();

            let settlement = settle(db, settle_to, &run.summary.run_result())?;
            Ok(ScenarioRunReport {
                summary: run.summary,
                feedback,
                settlement,
            })
        })
        .await
    }

    /// Runs the timed earthquake drill against a script and, when a learner
    /// is given and the drill completed, settles the result.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidInput` for a malformed script or an
    /// assignment without a learner, and `KawachError::AssignmentNotFound`
    /// for an unknown assignment.
    pub async fn run_ar_drill(&self, params: &RunArDrill) -> Result<TimedRunReport> {
        let config = self.settings.timed.clone();
        let script = TimedDrillScript::from(params);
        let user_id = params.user_id.clone();
        let assignment_id = params.assignment_id.clone();

        self.with_database(move |db| {
            let settle_to = settlement_target(
                db,
                user_id.as_deref(),
                assignment_id.as_deref(),
                AssignmentKind::ArDrill,
                AR_DRILL_CONTENT_ID,
            )?;

            let run = handlers::run_timed_script(&config, &script)?;

            let mut report = TimedRunReport {
                device_error: None,
                result: run.result.clone(),
                hazard_warnings: Vec::new(),
                countdown_resets: 0,
                settlement: None,
            };
            for event in run.events {
                match event {
                    TimedDrillEvent::DeviceUnavailable { reason } => {
                        report.device_error = Some(reason);
                    }
                    TimedDrillEvent::HazardWarning { tip, .. } => report.hazard_warnings.push(tip),
                    TimedDrillEvent::ReturnToCover {
                        countdown_reset: true,
                    } => report.countdown_resets += 1,
                    _ => {}
                }
            }

            if let Some(result) = &run.result {
                report.settlement = settle(db, settle_to, &result.run_result())?;
            }
            Ok(report)
        })
        .await
    }
}

/// Learner and assignment a run will be settled against.
struct SettlementTarget {
    user_id: String,
    assignment_id: Option<String>,
}

/// Checks the learner and assignment before a run starts.
///
/// The assignment must exist, be of `kind` and point at `content_id`.
fn settlement_target(
    db: &Database,
    user_id: Option<&str>,
    assignment_id: Option<&str>,
    kind: AssignmentKind,
    content_id: &str,
) -> Result<Option<SettlementTarget>> {
    let Some(user_id) = user_id else {
        if assignment_id.is_some() {
            return Err(KawachError::invalid_input("user_id")
                .with_reason("an assignment can only be completed by a learner"));
        }
        return Ok(None);
    };

    if let Some(id) = assignment_id {
        let assignment = db
            .get_assignment(id)?
            .ok_or_else(|| KawachError::AssignmentNotFound { id: id.to_string() })?;
        if assignment.kind != kind || assignment.content_id != content_id {
            return Err(KawachError::invalid_input("assignment_id").with_reason(format!(
                "assignment '{id}' is a {} for '{}', not a {} for '{content_id}'",
                assignment.kind.as_str(),
                assignment.content_id,
                kind.as_str()
            )));
        }
    }

    Ok(Some(SettlementTarget {
        user_id: user_id.to_string(),
        assignment_id: assignment_id.map(String::from),
    }))
}

fn settle(
    db: &mut Database,
    target: Option<SettlementTarget>,
    result: &RunResult,
) -> Result<Option<Settlement>> {
    target
        .map(|target| {
            handlers::settle_run(db, &target.user_id, target.assignment_id.as_deref(), result)
        })
        .transpose()
}
