//! Progress store abstraction.
//!
//! The engines never touch persistence. Once a run completes, the shell
//! settles its result through a [`ProgressStore`]; see
//! [`crate::handlers::settle_run`].

use std::collections::{HashMap, HashSet};

use crate::{
    db::Database,
    error::Result,
    models::{level_for_xp, UserProgress},
};

/// Persistent record of learner XP and completed assignments.
pub trait ProgressStore {
    /// Adds XP to a learner and returns the updated progress.
    fn credit(&mut self, user_id: &str, amount: u32) -> Result<UserProgress>;

    /// Records a completion. Returns false if it was already recorded.
    fn mark_completed(&mut self, user_id: &str, assignment_id: &str) -> Result<bool>;

    fn is_completed(&self, user_id: &str, assignment_id: &str) -> Result<bool>;

    fn progress(&self, user_id: &str) -> Result<UserProgress>;

    /// Atomically records the completion (if any) and credits `amount`.
    ///
    /// Returns None, writing nothing, when the learner already completed
    /// the assignment.
    fn settle(
        &mut self,
        user_id: &str,
        assignment_id: Option<&str>,
        amount: u32,
    ) -> Result<Option<UserProgress>>;
}

impl ProgressStore for Database {
    fn credit(&mut self, user_id: &str, amount: u32) -> Result<UserProgress> {
        self.credit_xp(user_id, amount)
    }

    fn mark_completed(&mut self, user_id: &str, assignment_id: &str) -> Result<bool> {
        self.mark_assignment_completed(user_id, assignment_id)
    }

    fn is_completed(&self, user_id: &str, assignment_id: &str) -> Result<bool> {
        self.is_assignment_completed(user_id, assignment_id)
    }

    fn progress(&self, user_id: &str) -> Result<UserProgress> {
        self.get_progress(user_id)
    }

    fn settle(
        &mut self,
        user_id: &str,
        assignment_id: Option<&str>,
        amount: u32,
    ) -> Result<Option<UserProgress>> {
        self.settle_xp(user_id, assignment_id, amount)
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    xp: HashMap<String, u64>,
    completions: HashSet<(String, String)>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn credit(&mut self, user_id: &str, amount: u32) -> Result<UserProgress> {
        *self.xp.entry(user_id.to_string()).or_default() += u64::from(amount);
        self.progress(user_id)
    }

    fn mark_completed(&mut self, user_id: &str, assignment_id: &str) -> Result<bool> {
        Ok(self
            .completions
            .insert((user_id.to_string(), assignment_id.to_string())))
    }

    fn is_completed(&self, user_id: &str, assignment_id: &str) -> Result<bool> {
        Ok(self
            .completions
            .contains(&(user_id.to_string(), assignment_id.to_string())))
    }

    fn progress(&self, user_id: &str) -> Result<UserProgress> {
        let xp = self.xp.get(user_id).copied().unwrap_or(0);
        let completed = self
            .completions
            .iter()
            .filter(|(user, _)| user == user_id)
            .count();
        Ok(UserProgress {
            user_id: user_id.to_string(),
            xp,
            level: level_for_xp(xp),
            completed_assignments: completed as u32,
        })
    }

    fn settle(
        &mut self,
        user_id: &str,
        assignment_id: Option<&str>,
        amount: u32,
    ) -> Result<Option<UserProgress>> {
        if let Some(assignment_id) = assignment_id {
            if !self.mark_completed(user_id, assignment_id)? {
                return Ok(None);
            }
        }
        self.credit(user_id, amount).map(Some)
    }
}
