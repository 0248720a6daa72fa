//! Timed drop-cover-hold-evacuate drill.
//!
//! Progress is gated by a continuously held "safe position" signal rather
//! than discrete answers. The shell pushes signal changes through
//! [`TimedDrill::on_hold_changed`], taps through [`TimedDrill::tap_hazard`]
//! and the final action through [`TimedDrill::evacuate`]; timers advance
//! through [`TimedDrill::poll`].
//!
//! ```text
//! Idle -start-> Shaking -shake elapsed-> AwaitingCover -cover-> HoldingCover
//!   |                                                      (hold -> countdown)
//!   +-device unavailable-> DeviceError                          |
//!                                          countdown reaches 0  v
//!                            Complete <-evacuate- Evacuating <--+
//! ```
//!
//! Releasing the signal while holding cover never changes the phase: during
//! the hold stage it cancels the hold timer, during the countdown stage it
//! resets the countdown to its start value. Either way a `ReturnToCover`
//! event asks the learner to get back under cover.

use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    clock::{Clock, TimerId, TimerQueue},
    engine::scoring,
    error::Result,
    models::{TimedDrillConfig, TimedDrillResult},
};

/// Failure to acquire the input device a drill needs (camera, sensor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input device unavailable: {reason}")]
pub struct DeviceUnavailable {
    pub reason: String,
}

/// Source of the learner's physical input, probed once per run.
pub trait InputDevice {
    fn acquire(&mut self) -> std::result::Result<(), DeviceUnavailable>;
}

/// Device that is always available, for scripted and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailableDevice;

impl InputDevice for AvailableDevice {
    fn acquire(&mut self) -> std::result::Result<(), DeviceUnavailable> {
        Ok(())
    }
}

/// Device that always fails with the given reason.
#[derive(Debug, Clone)]
pub struct UnavailableDevice {
    pub reason: String,
}

impl InputDevice for UnavailableDevice {
    fn acquire(&mut self) -> std::result::Result<(), DeviceUnavailable> {
        Err(DeviceUnavailable {
            reason: self.reason.clone(),
        })
    }
}

/// Phase of the drill, as reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillPhase {
    Idle,
    Shaking,
    AwaitingCover,
    HoldingCover,
    Evacuating,
    Complete,
    DeviceError,
}

impl DrillPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrillPhase::Idle => "idle",
            DrillPhase::Shaking => "shaking",
            DrillPhase::AwaitingCover => "awaiting_cover",
            DrillPhase::HoldingCover => "holding_cover",
            DrillPhase::Evacuating => "evacuating",
            DrillPhase::Complete => "complete",
            DrillPhase::DeviceError => "device_error",
        }
    }
}

/// Sub-phase of [`DrillPhase::HoldingCover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldStage {
    /// Cover must be held for the hold duration; hazards are live
    Hold,
    /// Cover must be held until the countdown reaches zero
    Countdown,
}

/// Notifications for the hosting shell.
#[derive(Debug, Clone, PartialEq)]
pub enum TimedDrillEvent {
    PhaseChanged { from: DrillPhase, to: DrillPhase },
    CoverTaken { reaction_secs: f64 },
    CountdownStarted { remaining: u32 },
    CountdownTick { remaining: u32 },
    ReturnToCover { countdown_reset: bool },
    HazardWarning { hazard_id: String, tip: String },
    DeviceUnavailable { reason: String },
    Completed(TimedDrillResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimedTimer {
    ShakeElapsed,
    HoldElapsed,
    CountdownTick,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CoverStage {
    Hold { timer: Option<TimerId> },
    Countdown { remaining: u32, ticker: Option<TimerId> },
}

#[derive(Debug, Clone, PartialEq)]
enum PhaseState {
    Idle,
    Shaking {
        reaction_start: Duration,
    },
    AwaitingCover {
        reaction_start: Duration,
    },
    HoldingCover {
        reaction_secs: f64,
        stage: CoverStage,
    },
    Evacuating {
        reaction_secs: f64,
        evacuation_start: Duration,
    },
    Complete(TimedDrillResult),
    DeviceError {
        reason: String,
    },
}

impl PhaseState {
    fn phase(&self) -> DrillPhase {
        match self {
            PhaseState::Idle => DrillPhase::Idle,
            PhaseState::Shaking { .. } => DrillPhase::Shaking,
            PhaseState::AwaitingCover { .. } => DrillPhase::AwaitingCover,
            PhaseState::HoldingCover { .. } => DrillPhase::HoldingCover,
            PhaseState::Evacuating { .. } => DrillPhase::Evacuating,
            PhaseState::Complete(_) => DrillPhase::Complete,
            PhaseState::DeviceError { .. } => DrillPhase::DeviceError,
        }
    }
}

/// State machine for the timed physical-response drill.
pub struct TimedDrill<C: Clock> {
    clock: C,
    config: TimedDrillConfig,
    state: PhaseState,
    in_safe_zone: bool,
    timers: TimerQueue<TimedTimer>,
    generation: u64,
    events: Vec<TimedDrillEvent>,
}

impl<C: Clock> TimedDrill<C> {
    /// Creates an idle drill reading time from `clock`.
    pub fn new(clock: C, config: TimedDrillConfig) -> Self {
        Self {
            clock,
            config,
            state: PhaseState::Idle,
            in_safe_zone: false,
            timers: TimerQueue::new(),
            generation: 0,
            events: Vec::new(),
        }
    }

    /// Starts the drill from `Idle`, probing the input device first.
    ///
    /// Enters `Shaking` on success or `DeviceError` when the device cannot be
    /// acquired. Calls outside `Idle` are ignored. Returns the resulting
    /// phase.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidInput` if the drill configuration is
    /// malformed; the drill stays `Idle`.
    pub fn start(&mut self, device: &mut impl InputDevice) -> Result<DrillPhase> {
        self.config.validate()?;

        if self.state != PhaseState::Idle {
            debug!("Start ignored in phase {}", self.phase().as_str());
            return Ok(self.phase());
        }

        self.timers.cancel_all();
        self.generation += 1;

        if let Err(err) = device.acquire() {
            warn!("Timed drill cannot start: {err}");
            self.set_state(PhaseState::DeviceError {
                reason: err.reason.clone(),
            });
            self.events.push(TimedDrillEvent::DeviceUnavailable {
                reason: err.reason,
            });
            return Ok(DrillPhase::DeviceError);
        }

        let now = self.clock.now();
        info!("Timed drill started (run {})", self.generation);
        self.timers.schedule(
            TimedTimer::ShakeElapsed,
            now + self.config.shake_duration(),
            self.generation,
        );
        self.set_state(PhaseState::Shaking {
            reaction_start: now,
        });
        Ok(DrillPhase::Shaking)
    }

    /// Pushes a change of the "holding safe position" signal.
    pub fn on_hold_changed(&mut self, holding: bool) {
        self.poll();

        let was_holding = self.in_safe_zone;
        self.in_safe_zone = holding;
        let now = self.clock.now();

        match self.state.clone() {
            PhaseState::AwaitingCover { reaction_start } if holding => {
                self.take_cover(now, reaction_start);
            }
            PhaseState::HoldingCover {
                reaction_secs,
                stage,
            } => {
                let stage = if holding {
                    self.resume_cover(stage, now)
                } else {
                    self.break_cover(stage, was_holding)
                };
                self.state = PhaseState::HoldingCover {
                    reaction_secs,
                    stage,
                };
            }
            _ => {}
        }
    }

    /// Handles a tap on a hazard hot-zone.
    ///
    /// Only accepted during the hold stage: the pending hold timer is
    /// cancelled and a warning is emitted. The learner has to take cover
    /// again to re-arm the timer. Returns whether the tap was accepted.
    pub fn tap_hazard(&mut self, hazard_id: &str) -> bool {
        self.poll();

        let PhaseState::HoldingCover {
            stage: CoverStage::Hold { timer },
            ..
        } = &mut self.state
        else {
            debug!("Hazard tap ignored outside the hold stage");
            return false;
        };
        let Some(hazard) = self.config.hazard(hazard_id) else {
            debug!("Hazard tap ignored: unknown hazard '{hazard_id}'");
            return false;
        };

        if let Some(id) = timer.take() {
            self.timers.cancel(id);
        }
        info!("Hazard '{hazard_id}' tapped; hold timer cancelled");
        self.events.push(TimedDrillEvent::HazardWarning {
            hazard_id: hazard.id.clone(),
            tip: hazard.tip.clone(),
        });
        true
    }

    /// Completes the drill. Only accepted while `Evacuating`.
    pub fn evacuate(&mut self) -> bool {
        self.poll();

        let PhaseState::Evacuating {
            reaction_secs,
            evacuation_start,
        } = self.state
        else {
            debug!("Evacuate ignored in phase {}", self.phase().as_str());
            return false;
        };

        let evacuation_secs = self
            .clock
            .now()
            .saturating_sub(evacuation_start)
            .as_secs_f64();
        let result = self.compute_result(reaction_secs, evacuation_secs);
        info!(
            "Timed drill complete: reaction {:.2}s, evacuation {:.2}s, {} XP",
            result.reaction_secs, result.evacuation_secs, result.awarded_xp
        );

        self.timers.cancel_all();
        self.set_state(PhaseState::Complete(result.clone()));
        self.events.push(TimedDrillEvent::Completed(result));
        true
    }

    /// Returns to `Idle`, cancelling every pending timer.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.generation += 1;
        self.in_safe_zone = false;
        if self.state != PhaseState::Idle {
            self.set_state(PhaseState::Idle);
        }
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
                TimedTimer::ShakeElapsed => self.on_shake_elapsed(timer.due),
                TimedTimer::HoldElapsed => self.on_hold_elapsed(timer.id, timer.due),
                TimedTimer::CountdownTick => self.on_countdown_tick(timer.id, timer.due),
            }
        }
    }

    pub fn phase(&self) -> DrillPhase {
        self.state.phase()
    }

    /// Sub-phase while holding cover.
    pub fn hold_stage(&self) -> Option<HoldStage> {
        match self.state {
            PhaseState::HoldingCover {
                stage: CoverStage::Hold { .. },
                ..
            } => Some(HoldStage::Hold),
            PhaseState::HoldingCover {
                stage: CoverStage::Countdown { .. },
                ..
            } => Some(HoldStage::Countdown),
            _ => None,
        }
    }

    /// Current countdown value; the start value outside the countdown stage.
    pub fn countdown_remaining(&self) -> u32 {
        match self.state {
            PhaseState::HoldingCover {
                stage: CoverStage::Countdown { remaining, .. },
                ..
            } => remaining,
            _ => self.config.countdown_start,
        }
    }

    /// Whether the hold timer is armed during the hold stage.
    pub fn is_hold_timer_armed(&self) -> bool {
        matches!(
            self.state,
            PhaseState::HoldingCover {
                stage: CoverStage::Hold { timer: Some(_) },
                ..
            }
        )
    }

    pub fn is_in_safe_zone(&self) -> bool {
        self.in_safe_zone
    }

    /// Reaction time, once cover has been taken.
    pub fn reaction_secs(&self) -> Option<f64> {
        match &self.state {
            PhaseState::HoldingCover { reaction_secs, .. }
            | PhaseState::Evacuating { reaction_secs, .. } => Some(*reaction_secs),
            PhaseState::Complete(result) => Some(result.reaction_secs),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&TimedDrillResult> {
        match &self.state {
            PhaseState::Complete(result) => Some(result),
            _ => None,
        }
    }

    pub fn awarded_xp(&self) -> Option<u32> {
        self.result().map(|result| result.awarded_xp)
    }

    /// Reason the device could not be acquired, in `DeviceError`.
    pub fn device_error(&self) -> Option<&str> {
        match &self.state {
            PhaseState::DeviceError { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn config(&self) -> &TimedDrillConfig {
        &self.config
    }

    /// When the next pending timer is due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Drains the notifications emitted since the last call.
    pub fn take_events(&mut self) -> Vec<TimedDrillEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_state(&mut self, next: PhaseState) {
        let from = self.state.phase();
        let to = next.phase();
        self.state = next;
        if from != to {
            debug!("Timed drill phase {} -> {}", from.as_str(), to.as_str());
            self.events.push(TimedDrillEvent::PhaseChanged { from, to });
        }
    }

    fn take_cover(&mut self, at: Duration, reaction_start: Duration) {
        let reaction_secs = at.saturating_sub(reaction_start).as_secs_f64();
        let timer = self.timers.schedule(
            TimedTimer::HoldElapsed,
            at + self.config.hold_duration(),
            self.generation,
        );
        self.events.push(TimedDrillEvent::CoverTaken {
            reaction_secs,
        });
        self.set_state(PhaseState::HoldingCover {
            reaction_secs,
            stage: CoverStage::Hold { timer: Some(timer) },
        });
    }

    fn resume_cover(&mut self, stage: CoverStage, now: Duration) -> CoverStage {
        match stage {
            CoverStage::Hold { timer: None } => {
                let timer = self.timers.schedule(
                    TimedTimer::HoldElapsed,
                    now + self.config.hold_duration(),
                    self.generation,
                );
                CoverStage::Hold { timer: Some(timer) }
            }
            CoverStage::Countdown {
                remaining,
                ticker: None,
            } => {
                let ticker = self.timers.schedule(
                    TimedTimer::CountdownTick,
                    now + self.config.countdown_interval(),
                    self.generation,
                );
                CoverStage::Countdown {
                    remaining,
                    ticker: Some(ticker),
                }
            }
            running => running,
        }
    }

    fn break_cover(&mut self, stage: CoverStage, was_holding: bool) -> CoverStage {
        match stage {
            CoverStage::Hold { timer } => {
                if let Some(id) = timer {
                    self.timers.cancel(id);
                }
                if was_holding {
                    self.events.push(TimedDrillEvent::ReturnToCover {
                        countdown_reset: false,
                    });
                }
                CoverStage::Hold { timer: None }
            }
            CoverStage::Countdown { ticker, .. } => {
                if let Some(id) = ticker {
                    self.timers.cancel(id);
                }
                if was_holding {
                    info!("Cover lost during countdown; countdown reset");
                    self.events.push(TimedDrillEvent::ReturnToCover {
                        countdown_reset: true,
                    });
                }
                CoverStage::Countdown {
                    remaining: self.config.countdown_start,
                    ticker: None,
                }
            }
        }
    }

    fn on_shake_elapsed(&mut self, due: Duration) {
        let PhaseState::Shaking { reaction_start } = self.state else {
            return;
        };
        self.set_state(PhaseState::AwaitingCover { reaction_start });
        // Cover may already have been taken while the ground was shaking.
        if self.in_safe_zone {
            self.take_cover(due, reaction_start);
        }
    }

    fn on_hold_elapsed(&mut self, id: TimerId, due: Duration) {
        let PhaseState::HoldingCover {
            reaction_secs,
            stage: CoverStage::Hold { timer: Some(armed) },
        } = self.state
        else {
            return;
        };
        if armed != id {
            return;
        }

        let remaining = self.config.countdown_start;
        let ticker = self.timers.schedule(
            TimedTimer::CountdownTick,
            due + self.config.countdown_interval(),
            self.generation,
        );
        self.state = PhaseState::HoldingCover {
            reaction_secs,
            stage: CoverStage::Countdown {
                remaining,
                ticker: Some(ticker),
            },
        };
        self.events.push(TimedDrillEvent::CountdownStarted {
            remaining,
        });
    }

    fn on_countdown_tick(&mut self, id: TimerId, due: Duration) {
        let PhaseState::HoldingCover {
            reaction_secs,
            stage:
                CoverStage::Countdown {
                    remaining,
                    ticker: Some(armed),
                },
        } = self.state
        else {
            return;
        };
        if armed != id {
            return;
        }

        let remaining = remaining.saturating_sub(1);
        self.events.push(TimedDrillEvent::CountdownTick {
            remaining,
        });

        if remaining == 0 {
            self.set_state(PhaseState::Evacuating {
                reaction_secs,
                evacuation_start: due,
            });
            return;
        }

        let ticker = self.timers.schedule(
            TimedTimer::CountdownTick,
            due + self.config.countdown_interval(),
            self.generation,
        );
        self.state = PhaseState::HoldingCover {
            reaction_secs,
            stage: CoverStage::Countdown {
                remaining,
                ticker: Some(ticker),
            },
        };
    }

    fn compute_result(&self, reaction_secs: f64, evacuation_secs: f64) -> TimedDrillResult {
        let xp = scoring::score(&self.config.scoring, reaction_secs, evacuation_secs);
        let reaction_rating = scoring::rate(reaction_secs, &self.config.reaction_thresholds);
        let evacuation_rating =
            scoring::rate(evacuation_secs, &self.config.evacuation_thresholds);

        TimedDrillResult {
            reaction_secs,
            evacuation_secs,
            reaction_rating,
            evacuation_rating,
            verdict: scoring::verdict(reaction_rating, evacuation_rating),
            awarded_xp: xp.total(),
            xp,
        }
    }
}
