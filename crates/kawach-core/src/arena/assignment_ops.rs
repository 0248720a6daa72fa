//! Learner progress and assignment operations for the Arena.

use jiff::Timestamp;
use log::info;

use super::Arena;
use crate::{
    db::assignment_queries::NewAssignment,
    display::AssignmentEntries,
    error::{KawachError, Result},
    handlers,
    models::{Assignment, AssignmentKind, RunResult, Settlement, UserProgress, AR_DRILL_CONTENT_ID},
    params::{CompleteAssignment, CreateAssignment, ListAssignments, UserId},
};

impl Arena {
    /// XP, level and completed assignment count of a learner.
    pub async fn progress(&self, params: &UserId) -> Result<UserProgress> {
        let user_id = params.user_id.clone();
        self.with_database(move |db| db.get_progress(&user_id)).await
    }

    /// Creates an assignment.
    ///
    /// Drill assignments must name a scenario in the catalogue and AR drill
    /// assignments must use [`AR_DRILL_CONTENT_ID`].
    ///
    /// # Errors
    ///
    /// Returns `KawachError::InvalidInput` for malformed parameters,
    /// `KawachError::ScenarioNotFound` for an unknown drill scenario, and
    /// `KawachError::Database` if the ID is already taken.
    pub async fn create_assignment(&self, params: &CreateAssignment) -> Result<Assignment> {
        let (kind, due_date) = params.validate()?;

        match kind {
            AssignmentKind::Drill => {
                self.content.require(&params.content_id)?;
            }
            AssignmentKind::ArDrill if params.content_id != AR_DRILL_CONTENT_ID => {
                return Err(KawachError::invalid_input("content_id").with_reason(format!(
                    "AR drill assignments must use '{AR_DRILL_CONTENT_ID}'"
                )));
            }
            _ => {}
        }

        let id = params
            .id
            .clone()
            .unwrap_or_else(|| format!("asg-{}", Timestamp::now().as_millisecond()));
        let title = params.title.clone();
        let content_id = params.content_id.clone();
        let assigned_by = params.assigned_by.clone();

        let assignment = self
            .with_database(move |db| {
                db.create_assignment(&NewAssignment {
                    id: &id,
                    title: &title,
                    kind,
                    content_id: &content_id,
                    due_date,
                    assigned_by: &assigned_by,
                })
            })
            .await?;
        info!("Created assignment '{}' ({})", assignment.id, kind.as_str());
        Ok(assignment)
    }

    /// Lists assignments, with completion status when a learner is given.
    pub async fn list_assignments(&self, params: &ListAssignments) -> Result<AssignmentEntries> {
        let user_id = params.user_id.clone();
        let entries = self
            .with_database(move |db| db.list_assignments(user_id.as_deref()))
            .await?;
        Ok(AssignmentEntries(entries))
    }

    /// Records a quiz or module assignment as completed, crediting its XP.
    ///
    /// Drill assignments are completed by playing the drill instead.
    ///
    /// # Errors
    ///
    /// Returns `KawachError::AssignmentNotFound` for an unknown assignment and
    /// `KawachError::InvalidInput` for a drill assignment.
    pub async fn complete_assignment(&self, params: &CompleteAssignment) -> Result<Settlement> {
        let user_id = params.user_id.clone();
        let assignment_id = params.assignment_id.clone();
        let xp = params.xp;

        self.with_database(move |db| {
            let assignment = db
                .get_assignment(&assignment_id)?
                .ok_or_else(|| KawachError::AssignmentNotFound {
                    id: assignment_id.clone(),
                })?;
            if matches!(assignment.kind, AssignmentKind::Drill | AssignmentKind::ArDrill) {
                return Err(KawachError::invalid_input("assignment_id").with_reason(
                    "drill assignments are completed by playing the drill",
                ));
            }

            let result = RunResult {
                score: xp,
                reaction_secs: None,
                evacuation_secs: None,
                awarded_xp: xp,
            };
            handlers::settle_run(db, &user_id, Some(&assignment_id), &result)
        })
        .await
    }
}
