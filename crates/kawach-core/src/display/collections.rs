//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::{AssignmentEntry, ScenarioDefinition};

/// Newtype wrapper for displaying the scenario catalogue.
///
/// # Examples
///
/// ```rust
/// use kawach_core::{content::ContentStore, display::Scenarios};
///
/// let store = ContentStore::builtin()?;
/// let scenarios = Scenarios(store.list().into_iter().cloned().collect());
/// let output = scenarios.to_string();
/// assert!(output.contains("## Fire Evacuation Drill (ID: fire-cafeteria-drill)"));
/// # kawach_core::Result::<()>::Ok(())
/// ```
pub struct Scenarios(pub Vec<ScenarioDefinition>);

impl Scenarios {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScenarioDefinition> {
        self.0.iter()
    }
}

impl Index<usize> for Scenarios {
    type Output = ScenarioDefinition;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Scenarios {
    type Item = ScenarioDefinition;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Scenarios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No scenarios found.");
        }
        for scenario in &self.0 {
            scenario.fmt_summary(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying assignment lists.
pub struct AssignmentEntries(pub Vec<AssignmentEntry>);

impl AssignmentEntries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssignmentEntry> {
        self.0.iter()
    }
}

impl Index<usize> for AssignmentEntries {
    type Output = AssignmentEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for AssignmentEntries {
    type Item = AssignmentEntry;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for AssignmentEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No assignments found.");
        }
        for entry in &self.0 {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
