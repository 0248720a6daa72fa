//! Scenario catalogue.
//!
//! The built-in drills are embedded at compile time; additional scenarios can
//! be loaded from a directory of JSON files, each holding one
//! [`ScenarioDefinition`]. Later loads replace scenarios with the same ID.

use std::{collections::BTreeMap, fs, path::Path};

use log::{debug, info};

use crate::{
    error::{KawachError, Result},
    models::ScenarioDefinition,
};

const BUILTIN_SCENARIOS: [(&str, &str); 3] = [
    (
        "earthquake-library-drill.json",
        include_str!("../assets/scenarios/earthquake-library-drill.json"),
    ),
    (
        "fire-cafeteria-drill.json",
        include_str!("../assets/scenarios/fire-cafeteria-drill.json"),
    ),
    (
        "flood-school-drill.json",
        include_str!("../assets/scenarios/flood-school-drill.json"),
    ),
];

/// Read-only lookup of scenario definitions by ID.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    scenarios: BTreeMap<String, ScenarioDefinition>,
}

impl ContentStore {
    /// Creates a store with no scenarios.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a store holding the built-in drills.
    ///
    /// # Errors
    ///
    /// Fails only if an embedded scenario is malformed.
    pub fn builtin() -> Result<Self> {
        let mut store = Self::empty();
        for (name, json) in BUILTIN_SCENARIOS {
            let scenario = parse_scenario(json).map_err(|e| KawachError::Configuration {
                message: format!("Built-in scenario {name} is invalid: {e}"),
            })?;
            store.insert(scenario)?;
        }
        Ok(store)
    }

    /// Adds or replaces a scenario after validating it.
    pub fn insert(&mut self, scenario: ScenarioDefinition) -> Result<()> {
        scenario.validate()?;
        if self.scenarios.contains_key(&scenario.id) {
            debug!("Replacing scenario '{}'", scenario.id);
        }
        self.scenarios.insert(scenario.id.clone(), scenario);
        Ok(())
    }

    /// Loads every `*.json` file in `dir`. Returns how many were loaded.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::FileSystem` if the directory or a file cannot be
    /// read, `KawachError::Serialization` for malformed JSON and
    /// `KawachError::InvalidScenario` for a definition that fails validation.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let entries = fs::read_dir(dir).map_err(|source| KawachError::FileSystem {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| KawachError::FileSystem {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let json = fs::read_to_string(path).map_err(|source| KawachError::FileSystem {
                path: path.clone(),
                source,
            })?;
            let scenario = parse_scenario(&json)?;
            debug!("Loaded scenario '{}' from {}", scenario.id, path.display());
            self.insert(scenario)?;
        }

        info!("Loaded {} scenario(s) from {}", paths.len(), dir.display());
        Ok(paths.len())
    }

    pub fn get(&self, id: &str) -> Option<&ScenarioDefinition> {
        self.scenarios.get(id)
    }

    /// Looks up a scenario, failing with `ScenarioNotFound`.
    pub fn require(&self, id: &str) -> Result<&ScenarioDefinition> {
        self.get(id).ok_or_else(|| KawachError::ScenarioNotFound { id: id.to_string() })
    }

    /// All scenarios, ordered by ID.
    pub fn list(&self) -> Vec<&ScenarioDefinition> {
        self.scenarios.values().collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

fn parse_scenario(json: &str) -> Result<ScenarioDefinition> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue() {
        let store = ContentStore::builtin().unwrap();
        let ids: Vec<&str> = store.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "earthquake-library-drill",
                "fire-cafeteria-drill",
                "flood-school-drill"
            ]
        );

        let earthquake = store.require("earthquake-library-drill").unwrap();
        assert_eq!(earthquake.steps.len(), 4);
        let answers: Vec<Option<usize>> =
            earthquake.steps.iter().map(|s| s.correct_option()).collect();
        assert_eq!(answers, vec![Some(1), Some(1), Some(0), Some(2)]);

        let flood = store.require("flood-school-drill").unwrap();
        assert_eq!(flood.steps[1].options.len(), 2);
        assert_eq!(flood.max_score(), 75);
    }

    #[test]
    fn test_require_unknown_scenario() {
        let store = ContentStore::empty();
        assert!(matches!(
            store.require("tsunami-drill"),
            Err(KawachError::ScenarioNotFound { ref id }) if id == "tsunami-drill"
        ));
    }

    #[test]
    fn test_load_dir_overrides_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("fire.json"),
            r#"{
                "id": "fire-cafeteria-drill",
                "title": "Short Fire Drill",
                "reward_per_step": 10,
                "steps": [{
                    "situation": "The alarm sounds.",
                    "options": [
                        {"text": "Walk out", "is_correct": true, "feedback": "Good"},
                        {"text": "Stay", "feedback": "No"}
                    ]
                }]
            }"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a scenario").unwrap();

        let mut store = ContentStore::builtin().unwrap();
        assert_eq!(store.load_dir(dir.path()).unwrap(), 1);
        assert_eq!(store.len(), 3);
        let fire = store.require("fire-cafeteria-drill").unwrap();
        assert_eq!(fire.title, "Short Fire Drill");
        assert_eq!(fire.max_score(), 10);
    }

    #[test]
    fn test_load_dir_rejects_invalid_scenario() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("broken.json"),
            r#"{"id": "broken", "title": "Broken", "steps": []}"#,
        )
        .unwrap();

        let mut store = ContentStore::empty();
        assert!(matches!(
            store.load_dir(dir.path()),
            Err(KawachError::InvalidScenario { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_missing_dir() {
        let mut store = ContentStore::empty();
        let err = store.load_dir(Path::new("/nonexistent/kawach")).unwrap_err();
        assert!(matches!(err, KawachError::FileSystem { .. }));
    }
}
