//! Learner XP and assignment completion records.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::{
    error::{DatabaseResultExt, Result},
    models::{level_for_xp, UserProgress},
};

const UPSERT_XP_SQL: &str = "INSERT INTO learners (user_id, xp, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) \
     ON CONFLICT(user_id) DO UPDATE SET xp = xp + excluded.xp, updated_at = excluded.updated_at";
const SELECT_XP_SQL: &str = "SELECT xp FROM learners WHERE user_id = ?1";
const COUNT_COMPLETIONS_SQL: &str =
    "SELECT COUNT(*) FROM assignment_completions WHERE user_id = ?1";
const INSERT_COMPLETION_SQL: &str = "INSERT OR IGNORE INTO assignment_completions (assignment_id, user_id, completed_at) VALUES (?1, ?2, ?3)";
const CHECK_COMPLETION_SQL: &str = "SELECT EXISTS(SELECT 1 FROM assignment_completions WHERE assignment_id = ?1 AND user_id = ?2)";

impl super::Database {
    /// Adds `amount` XP to a learner, creating the learner on first credit.
    pub fn credit_xp(&mut self, user_id: &str, amount: u32) -> Result<UserProgress> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        tx.execute(UPSERT_XP_SQL, params![user_id, i64::from(amount), &now])
            .db_context("Failed to credit XP")?;

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_progress(user_id)
    }

    /// Records an assignment completion and credits its XP in one transaction.
    ///
    /// The completion is inserted first; XP is only credited when that insert
    /// took effect. Returns None if the learner had already completed the
    /// assignment, in which case nothing is written. Without an assignment
    /// the XP is always credited.
    pub fn settle_xp(
        &mut self,
        user_id: &str,
        assignment_id: Option<&str>,
        amount: u32,
    ) -> Result<Option<UserProgress>> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        if let Some(assignment_id) = assignment_id {
            let inserted = tx
                .execute(INSERT_COMPLETION_SQL, params![assignment_id, user_id, &now])
                .db_context("Failed to record assignment completion")?;
            if inserted == 0 {
                return Ok(None);
            }
        }
        tx.execute(UPSERT_XP_SQL, params![user_id, i64::from(amount), &now])
            .db_context("Failed to credit XP")?;

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_progress(user_id).map(Some)
    }

    /// Current progress of a learner. Unknown learners have zero XP.
    pub fn get_progress(&self, user_id: &str) -> Result<UserProgress> {
        let xp: i64 = self
            .connection
            .query_row(SELECT_XP_SQL, params![user_id], |row| row.get(0))
            .optional()
            .db_context("Failed to query learner XP")?
            .unwrap_or(0);

        let completed: i64 = self
            .connection
            .query_row(COUNT_COMPLETIONS_SQL, params![user_id], |row| row.get(0))
            .db_context("Failed to count completed assignments")?;

        let xp = xp.max(0) as u64;
        Ok(UserProgress {
            user_id: user_id.to_string(),
            xp,
            level: level_for_xp(xp),
            completed_assignments: completed.max(0) as u32,
        })
    }

    /// Records that a learner completed an assignment.
    ///
    /// Returns false if the completion was already recorded.
    pub fn mark_assignment_completed(
        &mut self,
        user_id: &str,
        assignment_id: &str,
    ) -> Result<bool> {
        let now = Timestamp::now().to_string();
        let inserted = self
            .connection
            .execute(INSERT_COMPLETION_SQL, params![assignment_id, user_id, &now])
            .db_context("Failed to record assignment completion")?;
        Ok(inserted == 1)
    }

    /// Whether a learner has completed an assignment.
    pub fn is_assignment_completed(&self, user_id: &str, assignment_id: &str) -> Result<bool> {
        self.connection
            .query_row(CHECK_COMPLETION_SQL, params![assignment_id, user_id], |row| {
                row.get(0)
            })
            .db_context("Failed to check assignment completion")
    }
}
