//! Data models for scenarios, drill configuration, results and progress.
//!
//! Display implementations for these models live in
//! [`crate::display::models`], keeping data and presentation apart.
//!
//! ## Submodules
//!
//! - [`scenario`]: authored scenario content ([`ScenarioDefinition`], [`Step`])
//! - [`config`]: engine pacing, scoring constants and hazards
//! - [`results`]: run outcomes ([`ResultsSummary`], [`TimedDrillResult`])
//! - [`progress`]: learner XP, assignments and settlements
//!
//! # Examples
//!
//! ```rust
//! use kawach_core::models::{ScenarioDefinition, ScenarioOption, Step};
//!
//! let scenario = ScenarioDefinition {
//!     id: "fire-cafeteria-drill".to_string(),
//!     title: "Fire Evacuation Drill".to_string(),
//!     description: None,
//!     reward_per_step: 25,
//!     steps: vec![Step {
//!         situation: "The fire alarm sounds.".to_string(),
//!         image: None,
//!         options: vec![
//!             ScenarioOption {
//!                 text: "Walk to the nearest exit.".to_string(),
//!                 is_correct: true,
//!                 feedback: "Correct.".to_string(),
//!             },
//!             ScenarioOption {
//!                 text: "Finish lunch first.".to_string(),
//!                 is_correct: false,
//!                 feedback: "Every second counts.".to_string(),
//!             },
//!         ],
//!     }],
//! };
//! assert!(scenario.validate().is_ok());
//! assert_eq!(scenario.max_score(), 25);
//! ```

pub mod config;
pub mod progress;
pub mod results;
pub mod scenario;


pub use config::{
    EngineSettings, Hazard, RatingThresholds, ScenarioEngineConfig, ScoringConfig,
    TimedDrillConfig,
};
pub use progress::{
    level_for_xp, Assignment, AssignmentEntry, AssignmentKind, AssignmentStatus, Settlement,
    UserProgress, AR_DRILL_CONTENT_ID, XP_PER_LEVEL,
};
pub use results::{
    Rating, ResultsSummary, RunResult, ScenarioRunReport, StepOutcome, TimedDrillResult,
    TimedRunReport, Verdict, XpBreakdown,
};
pub use scenario::{ScenarioDefinition, ScenarioOption, Step, DEFAULT_REWARD_PER_STEP};
