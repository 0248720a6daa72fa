//! Drill engines.
//!
//! Both engines are plain state machines driven by the hosting shell. They
//! never block and never spawn work: delays live in a per-engine
//! [`TimerQueue`](crate::clock::TimerQueue) that fires when the shell calls
//! `poll()`, and notifications are drained with `take_events()`.
//!
//! - [`scenario`]: branching multiple-choice drills
//! - [`timed`]: the drop-cover-hold-evacuate drill gated by a held signal
//! - [`scoring`]: the XP formula and ratings for timed drills

pub mod scenario;
pub mod scoring;
pub mod timed;

#[cfg(test)]
mod tests;

pub use scenario::{
    DrillRunState, RunProgress, RunStatus, ScenarioEngine, ScenarioEvent, Selection,
};
pub use timed::{
    AvailableDevice, DeviceUnavailable, DrillPhase, HoldStage, InputDevice, TimedDrill,
    TimedDrillEvent, UnavailableDevice,
};
