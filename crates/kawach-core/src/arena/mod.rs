//! High-level API tying content, engines and persistence together.
//!
//! An [`Arena`] owns the scenario catalogue and engine settings and knows
//! where the progress database lives. Its async methods run each operation
//! on a blocking task with its own database connection, so it is cheap to
//! share between the CLI and the MCP server.
//!
//! ## Submodules
//!
//! - [`builder`]: configures database location, extra scenarios and settings
//! - [`drill_ops`]: scenario lookup and scripted drill runs with settlement
//! - [`assignment_ops`]: learner progress and assignments
//!
//! # Usage
//!
//! ```rust,no_run
//! use kawach_core::{params::PlayScenario, ArenaBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let arena = ArenaBuilder::new()
//!     .with_database_path(Some("/tmp/kawach.db"))
//!     .build()
//!     .await?;
//!
//! let report = arena
//!     .play_scenario(&PlayScenario {
//!         scenario_id: "fire-cafeteria-drill".to_string(),
//!         answers: vec![0, 1, 1],
//!         user_id: Some("asha".to_string()),
//!         assignment_id: None,
//!     })
//!     .await?;
//! assert_eq!(report.summary.score, 75);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::task;

use crate::{
    content::ContentStore,
    db::Database,
    error::{KawachError, Result},
    models::EngineSettings,
};

pub mod assignment_ops;
pub mod builder;
pub mod drill_ops;

pub use builder::ArenaBuilder;

/// Main interface for running drills and tracking progress.
pub struct Arena {
    pub(crate) db_path: PathBuf,
    pub(crate) content: ContentStore,
    pub(crate) settings: EngineSettings,
}

impl Arena {
    pub(crate) fn new(db_path: PathBuf, content: ContentStore, settings: EngineSettings) -> Self {
        Self {
            db_path,
            content,
            settings,
        }
    }

    /// Location of the progress database.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Engine settings in effect.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Runs `op` on a blocking task with a fresh database connection.
    pub(crate) async fn with_database<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(KawachError::join)?
    }
}
