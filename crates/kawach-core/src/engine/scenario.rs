//! Branching scenario engine.
//!
//! Replays a [`ScenarioDefinition`] one step at a time. Each selection is
//! scored immediately, then the engine waits `advance_delay` (so feedback can
//! be read) before presenting the next step or completing the run.
//!
//! ```text
//! NotStarted --start--> InProgress --select x N--> Completed
//!      ^                    |                          |
//!      +------abandon-------+-------------restart------+
//! ```

use std::time::Duration;

use log::{debug, info};

use crate::{
    clock::{Clock, TimerQueue},
    error::{KawachError, Result},
    models::{ResultsSummary, ScenarioDefinition, ScenarioEngineConfig, StepOutcome},
};

/// Coarse status of a run, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Mutable state of the current run.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillRunState {
    NotStarted,
    InProgress(RunProgress),
    Completed(ResultsSummary),
}

/// Data of a run that is still being answered.
#[derive(Debug, Clone, PartialEq)]
pub struct RunProgress {
    pub step_index: usize,
    pub score: u32,
    /// Option chosen for the current step, awaiting the advance
    pub selection: Option<usize>,
    pub outcomes: Vec<StepOutcome>,
}

/// Notifications for the hosting shell.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioEvent {
    Started {
        scenario_id: String,
        total_steps: usize,
    },
    StepPresented {
        step_index: usize,
    },
    OptionSelected {
        step_index: usize,
        option_index: usize,
        correct: bool,
        feedback: String,
    },
    Completed(ResultsSummary),
}

/// Outcome of a call to [`ScenarioEngine::select_option`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Recorded and scored; the advance is scheduled
    Recorded { correct: bool, feedback: String },
    /// Duplicate, stray or out-of-range input; nothing changed
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScenarioTimer {
    Advance,
}

/// Step sequencer for branching drills.
pub struct ScenarioEngine<C: Clock> {
    clock: C,
    config: ScenarioEngineConfig,
    scenario: Option<ScenarioDefinition>,
    state: DrillRunState,
    timers: TimerQueue<ScenarioTimer>,
    generation: u64,
    events: Vec<ScenarioEvent>,
}

impl<C: Clock> ScenarioEngine<C> {
    /// Creates an idle engine reading time from `clock`.
    pub fn new(clock: C, config: ScenarioEngineConfig) -> Self {
        Self {
            clock,
            config,
            scenario: None,
            state: DrillRunState::NotStarted,
            timers: TimerQueue::new(),
            generation: 0,
            events: Vec::new(),
        }
    }

    /// Validates `scenario` and begins a fresh run at step 0 with score 0.
    ///
    /// Any timers of a previous run are cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidScenario` if the scenario breaks the
    /// authoring contract; the engine then stays where it was.
    pub fn start(&mut self, scenario: ScenarioDefinition) -> Result<()> {
        scenario.validate()?;
        self.begin_run(scenario);
        Ok(())
    }

    /// Starts a fresh run of the most recently started scenario.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidInput` if no scenario was ever started.
    pub fn restart(&mut self) -> Result<()> {
        let scenario = self.scenario.take().ok_or_else(|| {
            KawachError::invalid_input("scenario").with_reason("no scenario has been started")
        })?;
        self.begin_run(scenario);
        Ok(())
    }

    /// Drops the current run and cancels its pending advance.
    pub fn abandon(&mut self) {
        if matches!(self.state, DrillRunState::InProgress(_)) {
            info!("Scenario run abandoned");
        }
        self.timers.cancel_all();
        self.generation += 1;
        self.state = DrillRunState::NotStarted;
    }

    /// Records the learner's choice for the current step.
    ///
    /// Ignored when no run is in progress, when the current step already has
    /// a selection, or when `option_index` is out of range.
    pub fn select_option(&mut self, option_index: usize) -> Selection {
        self.poll();

        let Some(scenario) = self.scenario.as_ref() else {
            return Selection::Ignored;
        };
        let DrillRunState::InProgress(progress) = &mut self.state else {
            debug!("Selection ignored: no run in progress");
            return Selection::Ignored;
        };
        if progress.selection.is_some() {
            debug!("Selection ignored: step {} already answered", progress.step_index);
            return Selection::Ignored;
        }
        let step_index = progress.step_index;
        let Some(option) = scenario.steps[step_index].options.get(option_index) else {
            debug!("Selection ignored: option {option_index} out of range");
            return Selection::Ignored;
        };

        let points = if option.is_correct {
            scenario.reward_per_step
        } else {
            0
        };
        progress.selection = Some(option_index);
        progress.score = progress.score.saturating_add(points);
        progress.outcomes.push(StepOutcome {
            step_index,
            selected_option: option_index,
            correct: option.is_correct,
            points,
        });

        let correct = option.is_correct;
        let feedback = option.feedback.clone();
        debug!("Step {step_index}: option {option_index} selected (correct: {correct})");

        self.timers.schedule(
            ScenarioTimer::Advance,
            self.clock.now() + self.config.advance_delay(),
            self.generation,
        );
        self.events.push(ScenarioEvent::OptionSelected {
            step_index,
            option_index,
            correct,
            feedback: feedback.clone(),
        });

        Selection::Recorded { correct, feedback }
    }

    /// Fires every timer that has come due.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        while let Some(timer) = self.timers.pop_due(now) {
            if timer.generation != self.generation {
                debug!("Discarding stale timer from run generation {}", timer.generation);
                continue;
            }
            match timer.kind {
                ScenarioTimer::Advance => self.advance(),
            }
        }
    }

    /// Final summary of a completed run.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::NotCompleted` unless the run has completed.
    pub fn results_summary(&self) -> Result<&ResultsSummary> {
        match &self.state {
            DrillRunState::Completed(summary) => Ok(summary),
            _ => Err(KawachError::NotCompleted),
        }
    }

    pub fn state(&self) -> &DrillRunState {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        match self.state {
            DrillRunState::NotStarted => RunStatus::NotStarted,
            DrillRunState::InProgress(_) => RunStatus::InProgress,
            DrillRunState::Completed(_) => RunStatus::Completed,
        }
    }

    /// Score so far, or the final score once completed.
    pub fn score(&self) -> u32 {
        match &self.state {
            DrillRunState::NotStarted => 0,
            DrillRunState::InProgress(progress) => progress.score,
            DrillRunState::Completed(summary) => summary.score,
        }
    }

    /// Index of the step being shown, while a run is in progress.
    pub fn current_step_index(&self) -> Option<usize> {
        match &self.state {
            DrillRunState::InProgress(progress) => Some(progress.step_index),
            _ => None,
        }
    }

    pub fn scenario(&self) -> Option<&ScenarioDefinition> {
        self.scenario.as_ref()
    }

    /// When the next pending timer is due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Drains the notifications emitted since the last call.
    pub fn take_events(&mut self) -> Vec<ScenarioEvent> {
        std::mem::take(&mut self.events)
    }

    fn begin_run(&mut self, scenario: ScenarioDefinition) {
        self.timers.cancel_all();
        self.generation += 1;

        info!(
            "Starting scenario '{}' ({} steps, run {})",
            scenario.id,
            scenario.steps.len(),
            self.generation
        );
        self.events.push(ScenarioEvent::Started {
            scenario_id: scenario.id.clone(),
            total_steps: scenario.steps.len(),
        });
        self.events.push(ScenarioEvent::StepPresented { step_index: 0 });

        self.state = DrillRunState::InProgress(RunProgress {
            step_index: 0,
            score: 0,
            selection: None,
            outcomes: Vec::with_capacity(scenario.steps.len()),
        });
        self.scenario = Some(scenario);
    }

    fn advance(&mut self) {
        let Some(scenario) = self.scenario.as_ref() else {
            return;
        };
        let DrillRunState::InProgress(progress) = &mut self.state else {
            return;
        };
        if progress.selection.is_none() {
            return;
        }

        if progress.step_index + 1 < scenario.steps.len() {
            progress.step_index += 1;
            progress.selection = None;
            self.events.push(ScenarioEvent::StepPresented {
                step_index: progress.step_index,
            });
            return;
        }

        let summary = ResultsSummary {
            scenario_id: scenario.id.clone(),
            title: scenario.title.clone(),
            score: progress.score,
            max_score: scenario.max_score(),
            outcomes: std::mem::take(&mut progress.outcomes),
        };
        info!(
            "Scenario '{}' completed with score {}/{}",
            summary.scenario_id, summary.score, summary.max_score
        );
        self.events.push(ScenarioEvent::Completed(summary.clone()));
        self.state = DrillRunState::Completed(summary);
    }
}
