//! Parameter structures for Kawach operations.
//!
//! These are shared by every interface. The CLI converts its clap argument
//! structs into them with `From` impls, and the MCP server wraps them
//! transparently so their JSON schema is generated from the doc comments
//! below (with the `schema` feature).

use jiff::civil::Date;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{KawachError, Result},
    handlers::TimedDrillScript,
    models::AssignmentKind,
};

fn default_true() -> bool {
    true
}

/// Parameters for operations on a single scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ScenarioId {
    /// ID of the scenario, e.g. 'earthquake-library-drill'
    pub id: String,
}

/// Parameters for playing a branching scenario drill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PlayScenario {
    /// ID of the scenario to play
    pub scenario_id: String,
    /// 0-indexed option chosen for each step, in step order
    pub answers: Vec<usize>,
    /// Learner to credit. Without a learner the run is not recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Assignment this run completes (requires user_id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
}

/// Parameters for a scripted run of the timed earthquake drill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RunArDrill {
    /// Seconds after the shaking starts at which the learner takes cover
    /// (default 1.0; cover taken while shaking counts when it stops)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_secs: Option<f64>,
    /// Seconds from the end of the countdown to the evacuation (default 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evacuation_secs: Option<f64>,
    /// Countdown value at which the learner briefly leaves cover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_at_countdown: Option<u32>,
    /// Hazards tapped while holding cover ('window', 'shelf')
    #[serde(default)]
    pub hazard_taps: Vec<String>,
    /// Whether the camera or sensor is available (default true)
    #[serde(default = "default_true")]
    pub device_available: bool,
    /// Learner to credit. Without a learner the run is not recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Assignment this run completes (requires user_id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
}

impl Default for RunArDrill {
    fn default() -> Self {
        Self {
            reaction_secs: None,
            evacuation_secs: None,
            release_at_countdown: None,
            hazard_taps: Vec::new(),
            device_available: true,
            user_id: None,
            assignment_id: None,
        }
    }
}

impl From<&RunArDrill> for TimedDrillScript {
    fn from(params: &RunArDrill) -> Self {
        let defaults = TimedDrillScript::default();
        TimedDrillScript {
            reaction_secs: params.reaction_secs.unwrap_or(defaults.reaction_secs),
            evacuation_secs: params.evacuation_secs.unwrap_or(defaults.evacuation_secs),
            release_at_countdown: params.release_at_countdown,
            hazard_taps: params.hazard_taps.clone(),
            device_available: params.device_available,
        }
    }
}

/// Parameters for operations on a single learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UserId {
    /// ID of the learner
    pub user_id: String,
}

/// Parameters for creating an assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateAssignment {
    /// Assignment ID; generated from the current time when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title shown to learners
    pub title: String,
    /// Kind of work: 'drill', 'ar_drill', 'quiz' or 'module'
    pub kind: String,
    /// Scenario ID for drills, 'earthquake-ar-drill' for AR drills, or the
    /// quiz/module identifier
    pub content_id: String,
    /// Due date as YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// ID of the teacher setting the assignment
    pub assigned_by: String,
}

impl CreateAssignment {
    /// Parses the kind and due date.
    ///
    /// ```rust
    /// use kawach_core::{models::AssignmentKind, params::CreateAssignment};
    ///
    /// let params = CreateAssignment {
    ///     title: "Fire drill".to_string(),
    ///     kind: "drill".to_string(),
    ///     content_id: "fire-cafeteria-drill".to_string(),
    ///     due_date: Some("2026-11-01".to_string()),
    ///     assigned_by: "ms-rao".to_string(),
    ///     ..Default::default()
    /// };
    /// let (kind, due) = params.validate()?;
    /// assert_eq!(kind, AssignmentKind::Drill);
    /// assert_eq!(due.map(|d| d.to_string()), Some("2026-11-01".to_string()));
    /// # kawach_core::Result::<()>::Ok(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidInput` for an empty title, content ID or
    /// teacher, an unknown kind, or a malformed date.
    pub fn validate(&self) -> Result<(AssignmentKind, Option<Date>)> {
        let required = [
            ("title", &self.title),
            ("content_id", &self.content_id),
            ("assigned_by", &self.assigned_by),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(KawachError::invalid_input(field).with_reason("must not be empty"));
            }
        }

        let kind = self.kind.parse::<AssignmentKind>().map_err(|_| {
            KawachError::invalid_input("kind").with_reason(format!(
                "Invalid kind: {}. Must be 'drill', 'ar_drill', 'quiz', or 'module'",
                self.kind
            ))
        })?;

        let due_date = self
            .due_date
            .as_deref()
            .map(|date| {
                date.parse::<Date>().map_err(|e| {
                    KawachError::invalid_input("due_date")
                        .with_reason(format!("expected YYYY-MM-DD: {e}"))
                })
            })
            .transpose()?;

        Ok((kind, due_date))
    }
}

/// Parameters for listing assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListAssignments {
    /// Show completion status for this learner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Parameters for completing a quiz or module assignment outside the drills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CompleteAssignment {
    /// ID of the learner
    pub user_id: String,
    /// ID of the assignment
    pub assignment_id: String,
    /// XP earned, e.g. the quiz score (default 0)
    #[serde(default)]
    pub xp: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(kind: &str, due_date: Option<&str>) -> CreateAssignment {
        CreateAssignment {
            id: None,
            title: "Earthquake practice".to_string(),
            kind: kind.to_string(),
            content_id: "earthquake-library-drill".to_string(),
            due_date: due_date.map(String::from),
            assigned_by: "ms-rao".to_string(),
        }
    }

    #[test]
    fn test_create_assignment_validate() {
        let (kind, due) = create("ar-drill", Some("2026-11-01")).validate().unwrap();
        assert_eq!(kind, AssignmentKind::ArDrill);
        assert_eq!(due, Some(jiff::civil::date(2026, 11, 1)));
    }

    #[test]
    fn test_create_assignment_invalid_kind() {
        match create("exam", None).validate().unwrap_err() {
            KawachError::InvalidInput { field, reason } => {
                assert_eq!(field, "kind");
                assert!(reason.contains("Invalid kind: exam"));
            }
            other => panic!("Expected InvalidInput error, got {other}"),
        }
    }

    #[test]
    fn test_create_assignment_invalid_date() {
        match create("drill", Some("next friday")).validate().unwrap_err() {
            KawachError::InvalidInput { field, .. } => assert_eq!(field, "due_date"),
            other => panic!("Expected InvalidInput error, got {other}"),
        }
    }

    #[test]
    fn test_create_assignment_requires_title() {
        let mut params = create("drill", None);
        params.title = "   ".to_string();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_run_ar_drill_defaults() {
        let params: RunArDrill = serde_json::from_str("{}").unwrap();
        assert!(params.device_available);

        let script = TimedDrillScript::from(&params);
        assert_eq!(script, TimedDrillScript::default());
    }
}
