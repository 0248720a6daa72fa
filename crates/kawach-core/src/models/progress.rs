//! Learner progress, assignments and settlement records.

use std::str::FromStr;

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

/// XP needed to advance one level.
pub const XP_PER_LEVEL: u64 = 1_000;

/// Content ID of the timed earthquake drill, used by `ar_drill` assignments.
pub const AR_DRILL_CONTENT_ID: &str = "earthquake-ar-drill";

/// Level reached with the given total XP. Every learner starts at level 1.
pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL) as u32 + 1
}

/// Accumulated XP and level of a learner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProgress {
    pub user_id: String,
    pub xp: u64,
    pub level: u32,
    /// Number of assignments this learner has completed
    pub completed_assignments: u32,
}

impl UserProgress {
    /// Progress of a learner who has not earned anything yet.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            xp: 0,
            level: 1,
            completed_assignments: 0,
        }
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        XP_PER_LEVEL - self.xp % XP_PER_LEVEL
    }
}

/// Type-safe enumeration of assignment kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    /// Branching scenario drill; `content_id` is a scenario ID
    Drill,
    /// Timed AR earthquake drill
    ArDrill,
    /// Quiz played outside the drill engines
    Quiz,
    /// Learning module
    Module,
}

impl FromStr for AssignmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drill" => Ok(AssignmentKind::Drill),
            "ar_drill" | "ar-drill" | "ardrill" => Ok(AssignmentKind::ArDrill),
            "quiz" => Ok(AssignmentKind::Quiz),
            "module" => Ok(AssignmentKind::Module),
            _ => Err(format!("Invalid assignment kind: {s}")),
        }
    }
}

impl AssignmentKind {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Drill => "drill",
            AssignmentKind::ArDrill => "ar_drill",
            AssignmentKind::Quiz => "quiz",
            AssignmentKind::Module => "module",
        }
    }
}

/// Work set by a teacher for learners to complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub kind: AssignmentKind,
    /// Scenario ID, quiz ID or module slug, depending on `kind`
    pub content_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    /// ID of the teacher who created the assignment
    pub assigned_by: String,
    pub created_at: Timestamp,
}

/// Completion state of an assignment for one learner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Completed,
}

impl AssignmentStatus {
    /// Status with a consistent icon for display.
    ///
    /// ```rust
    /// use kawach_core::models::AssignmentStatus;
    ///
    /// assert_eq!(AssignmentStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(AssignmentStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            AssignmentStatus::Completed => "✓ Completed",
            AssignmentStatus::Pending => "○ Pending",
        }
    }
}

/// An assignment as seen by a particular learner, or by a teacher when no
/// learner is selected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentEntry {
    pub assignment: Assignment,
    /// None when listed without a learner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// Number of learners who completed the assignment
    pub completions: u32,
}

/// What a single settlement wrote to the progress store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    /// XP credited by this settlement (0 when it was skipped)
    pub credited_xp: u32,
    /// True when the assignment was already completed and nothing was written
    pub already_completed: bool,
    /// Progress after the settlement
    pub progress: UserProgress,
}
