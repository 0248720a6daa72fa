//! Builder for creating and configuring Arena instances.

use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio::task;

use super::Arena;
use crate::{
    content::ContentStore,
    db::Database,
    error::{KawachError, Result},
    models::EngineSettings,
};

/// Builder for creating and configuring Arena instances.
#[derive(Debug, Clone, Default)]
pub struct ArenaBuilder {
    database_path: Option<PathBuf>,
    scenario_dir: Option<PathBuf>,
    settings: Option<EngineSettings>,
    settings_file: Option<PathBuf>,
}

impl ArenaBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/kawach/kawach.db` or `~/.local/share/kawach/kawach.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Loads additional scenarios from a directory of JSON files.
    ///
    /// Scenarios with the ID of a built-in drill replace it.
    pub fn with_scenario_dir<P: AsRef<Path>>(mut self, dir: Option<P>) -> Self {
        if let Some(dir) = dir {
            self.scenario_dir = Some(dir.as_ref().to_path_buf());
        }
        self
    }

    /// Uses the given engine settings instead of the defaults.
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Reads engine settings from a JSON file. Fields it omits keep their
    /// defaults. Takes precedence over [`ArenaBuilder::with_settings`].
    pub fn with_settings_file<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.settings_file = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured arena.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::FileSystem` if a path cannot be read or created,
    /// `KawachError::Database` if database initialization fails,
    /// `KawachError::Serialization` for a malformed settings or scenario file,
    /// and `KawachError::InvalidInput` / `KawachError::InvalidScenario` for
    /// content that fails validation.
    pub async fn build(self) -> Result<Arena> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KawachError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let scenario_dir = self.scenario_dir;
        let settings_file = self.settings_file;
        let settings = self.settings;
        let db_path_clone = db_path.clone();

        let (content, settings) = task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;

            let mut content = ContentStore::builtin()?;
            if let Some(dir) = scenario_dir {
                content.load_dir(&dir)?;
            }

            let settings = match settings_file {
                Some(path) => Self::read_settings(&path)?,
                None => settings.unwrap_or_default(),
            };
            settings.validate()?;

            Ok::<_, KawachError>((content, settings))
        })
        .await
        .map_err(KawachError::join)??;

        info!(
            "Arena ready: {} scenario(s), database {}",
            content.len(),
            db_path.display()
        );
        Ok(Arena::new(db_path, content, settings))
    }

    fn read_settings(path: &Path) -> Result<EngineSettings> {
        debug!("Reading engine settings from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| KawachError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Returns the default database path following the XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("kawach")
            .place_data_file("kawach.db")
            .map_err(|e| KawachError::XdgDirectory(e.to_string()))
    }
}
