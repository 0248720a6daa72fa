//! Core library for the Kawach disaster-preparedness trainer.
//!
//! Kawach turns safety drills into short games. Learners play branching
//! multiple-choice scenarios (earthquake, fire, flood) and a timed
//! drop-cover-hold-evacuate drill gated by a held "in cover" signal. Both
//! award XP that accumulates into levels and can complete assignments set by
//! a teacher.
//!
//! # Architecture
//!
//! - **Engines** ([`engine`]): deterministic state machines with an injectable
//!   [`clock::Clock`]. They emit events and never touch storage.
//! - **Collaborators**: the scenario catalogue ([`content::ContentStore`]) and
//!   the progress record ([`progress::ProgressStore`], backed by SQLite in
//!   [`db`]).
//! - **Shell** ([`handlers`], [`arena`]): drives the engines from scripted
//!   input and settles finished runs into the progress store exactly once.
//! - **Presentation** ([`display`]): markdown `Display` impls shared by the CLI
//!   and the MCP server.
//!
//! # Quick Start
//!
//! ```rust
//! use kawach_core::{
//!     handlers::{play_scenario, settle_run},
//!     models::ScenarioEngineConfig,
//!     ContentStore, MemoryProgressStore,
//! };
//!
//! let content = ContentStore::builtin()?;
//! let scenario = content.require("earthquake-library-drill")?;
//!
//! let run = play_scenario(scenario, &ScenarioEngineConfig::default(), &[1, 1, 0, 2])?;
//! assert_eq!(run.summary.score, 100);
//!
//! let mut store = MemoryProgressStore::new();
//! let settlement = settle_run(&mut store, "asha", None, &run.summary.run_result())?;
//! assert_eq!(settlement.progress.xp, 100);
//! # kawach_core::Result::<()>::Ok(())
//! ```

pub mod arena;
pub mod clock;
pub mod content;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod params;
pub mod progress;

// Re-export commonly used types
pub use arena::{Arena, ArenaBuilder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use content::ContentStore;
pub use db::Database;
pub use display::{AssignmentEntries, LocalDateTime, OperationStatus, Scenarios};
pub use engine::{DrillPhase, ScenarioEngine, TimedDrill};
pub use error::{KawachError, Result};
pub use handlers::settle_run;
pub use models::{
    Assignment, AssignmentKind, ResultsSummary, ScenarioDefinition, Settlement, TimedDrillResult,
    UserProgress,
};
pub use progress::{MemoryProgressStore, ProgressStore};
