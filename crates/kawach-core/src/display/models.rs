//! Display implementations for domain models.
//!
//! Everything renders as markdown so the CLI can hand it to the terminal
//! renderer and the MCP server can return it verbatim.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{
    Assignment, AssignmentEntry, AssignmentKind, Rating, ResultsSummary, ScenarioDefinition,
    ScenarioRunReport, Settlement, TimedDrillResult, TimedRunReport, UserProgress, Verdict,
};

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl ScenarioDefinition {
    /// Compact entry used in scenario lists.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.title, self.id)?;
        writeln!(f)?;
        if let Some(desc) = &self.description {
            writeln!(f, "- **Description**: {desc}")?;
        }
        writeln!(f, "- **Steps**: {}", self.steps.len())?;
        writeln!(f, "- **Max score**: {}", self.max_score())?;
        writeln!(f)
    }
}

impl fmt::Display for ScenarioDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Steps: {}", self.steps.len())?;
        writeln!(f, "- Reward: {} XP per correct answer", self.reward_per_step)?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "\n## Step {}", index + 1)?;
            writeln!(f)?;
            writeln!(f, "{}", step.situation)?;
            writeln!(f)?;
            for (option_index, option) in step.options.iter().enumerate() {
                writeln!(f, "- [{option_index}] {}", option.text)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Drill Complete: {}", self.title)?;
        writeln!(f)?;
        writeln!(f, "- **Score**: {}/{}", self.score, self.max_score)?;
        writeln!(
            f,
            "- **Correct answers**: {}/{}",
            self.correct_count(),
            self.total_steps()
        )?;
        writeln!(f)?;

        for outcome in &self.outcomes {
            let verdict = if outcome.correct {
                "✓ Correct"
            } else {
                "✗ Incorrect"
            };
            writeln!(
                f,
                "- Step {}: option {} {verdict} (+{})",
                outcome.step_index + 1,
                outcome.selected_option,
                outcome.points
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for ScenarioRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;

        if !self.feedback.is_empty() {
            writeln!(f, "\n## Feedback")?;
            writeln!(f)?;
            for (index, feedback) in self.feedback.iter().enumerate() {
                writeln!(f, "{}. {feedback}", index + 1)?;
            }
        }

        if let Some(settlement) = &self.settlement {
            writeln!(f)?;
            write!(f, "{settlement}")?;
        }

        Ok(())
    }
}

impl fmt::Display for TimedDrillResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Drill Complete!")?;
        writeln!(f)?;
        writeln!(
            f,
            "- **Reaction time**: {:.2}s ({})",
            self.reaction_secs, self.reaction_rating
        )?;
        writeln!(
            f,
            "- **Evacuation time**: {:.2}s ({})",
            self.evacuation_secs, self.evacuation_rating
        )?;
        writeln!(
            f,
            "- **XP**: {} (reaction {} + cover {} + evacuation {})",
            self.awarded_xp, self.xp.reaction, self.xp.cover, self.xp.evacuation
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.verdict)
    }
}

impl fmt::Display for TimedRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.device_error {
            writeln!(f, "# Drill Unavailable")?;
            writeln!(f)?;
            writeln!(f, "The drill could not start: {reason}")?;
            return Ok(());
        }

        if let Some(result) = &self.result {
            write!(f, "{result}")?;
        }

        if !self.hazard_warnings.is_empty() {
            writeln!(f, "\n## Hazard Warnings")?;
            writeln!(f)?;
            for tip in &self.hazard_warnings {
                writeln!(f, "- {tip}")?;
            }
        }

        if self.countdown_resets > 0 {
            writeln!(f)?;
            writeln!(
                f,
                "Cover was lost during the countdown {} time(s); the countdown restarted.",
                self.countdown_resets
            )?;
        }

        if let Some(settlement) = &self.settlement {
            writeln!(f)?;
            write!(f, "{settlement}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Progress for {}", self.user_id)?;
        writeln!(f)?;
        if self.already_completed {
            if let Some(id) = &self.assignment_id {
                writeln!(f, "Assignment {id} was already completed; no XP credited.")?;
                writeln!(f)?;
            }
        } else {
            writeln!(f, "- **XP earned**: +{}", self.credited_xp)?;
            if let Some(id) = &self.assignment_id {
                writeln!(f, "- **Assignment completed**: {id}")?;
            }
        }
        writeln!(
            f,
            "- **Total XP**: {} (Level {})",
            self.progress.xp, self.progress.level
        )
    }
}

impl fmt::Display for UserProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Progress: {}", self.user_id)?;
        writeln!(f)?;
        writeln!(f, "- **Level**: {}", self.level)?;
        writeln!(
            f,
            "- **XP**: {} ({} to next level)",
            self.xp,
            self.xp_to_next_level()
        )?;
        writeln!(f, "- **Completed assignments**: {}", self.completed_assignments)
    }
}

impl Assignment {
    fn fmt_details(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- **Kind**: {}", self.kind)?;
        writeln!(f, "- **Content**: {}", self.content_id)?;
        if let Some(due) = &self.due_date {
            writeln!(f, "- **Due**: {due}")?;
        }
        writeln!(f, "- **Assigned by**: {}", self.assigned_by)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.title, self.id)?;
        writeln!(f)?;
        self.fmt_details(f)?;
        writeln!(f)
    }
}

impl fmt::Display for AssignmentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assignment = &self.assignment;
        match self.status {
            Some(status) => writeln!(
                f,
                "## {} (ID: {}) {}",
                assignment.title,
                assignment.id,
                status.with_icon()
            )?,
            None => writeln!(f, "## {} (ID: {})", assignment.title, assignment.id)?,
        }
        writeln!(f)?;
        assignment.fmt_details(f)?;
        if let Some(completed_at) = &self.completed_at {
            writeln!(f, "- **Completed**: {}", LocalDateTime(completed_at))?;
        }
        writeln!(f, "- **Completions**: {}", self.completions)?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::{
        content::ContentStore,
        models::{AssignmentStatus, StepOutcome, XpBreakdown},
    };

    fn assignment() -> Assignment {
        Assignment {
            id: "asg-1".to_string(),
            title: "Earthquake practice".to_string(),
            kind: AssignmentKind::Drill,
            content_id: "earthquake-library-drill".to_string(),
            due_date: Some(jiff::civil::date(2026, 11, 1)),
            assigned_by: "ms-rao".to_string(),
            created_at: Timestamp::from_second(1_790_000_000).unwrap(),
        }
    }

    fn progress(xp: u64) -> UserProgress {
        UserProgress {
            user_id: "asha".to_string(),
            xp,
            level: crate::models::level_for_xp(xp),
            completed_assignments: 1,
        }
    }

    #[test]
    fn test_scenario_display_lists_options_without_answers() {
        let store = ContentStore::builtin().unwrap();
        let output = store.require("flood-school-drill").unwrap().to_string();

        assert!(output.starts_with("# Flood Response Drill"));
        assert!(output.contains("## Step 2"));
        assert!(output.contains("- [1] Use the designated emergency stairs"));
        assert!(!output.contains("Correct!"));
    }

    #[test]
    fn test_results_summary_display() {
        let summary = ResultsSummary {
            scenario_id: "fire-cafeteria-drill".to_string(),
            title: "Fire Evacuation Drill".to_string(),
            score: 50,
            max_score: 75,
            outcomes: vec![
                StepOutcome {
                    step_index: 0,
                    selected_option: 0,
                    correct: true,
                    points: 25,
                },
                StepOutcome {
                    step_index: 1,
                    selected_option: 2,
                    correct: false,
                    points: 0,
                },
            ],
        };
        let output = summary.to_string();
        assert!(output.contains("**Score**: 50/75"));
        assert!(output.contains("**Correct answers**: 1/2"));
        assert!(output.contains("- Step 2: option 2 ✗ Incorrect (+0)"));
    }

    #[test]
    fn test_timed_result_display() {
        let result = TimedDrillResult {
            reaction_secs: 2.0,
            evacuation_secs: 6.5,
            reaction_rating: Rating::Excellent,
            evacuation_rating: Rating::Good,
            verdict: Verdict::Excellent,
            xp: XpBreakdown {
                reaction: 30,
                cover: 50,
                evacuation: 18,
            },
            awarded_xp: 98,
        };
        let output = result.to_string();
        assert!(output.contains("**Reaction time**: 2.00s (Excellent!)"));
        assert!(output.contains("**Evacuation time**: 6.50s (Good)"));
        assert!(output.contains("**XP**: 98 (reaction 30 + cover 50 + evacuation 18)"));
        assert!(output.contains("You're a safety pro!"));
    }

    #[test]
    fn test_device_error_report_display() {
        let report = TimedRunReport {
            device_error: Some("no input device available".to_string()),
            result: None,
            hazard_warnings: Vec::new(),
            countdown_resets: 0,
            settlement: None,
        };
        let output = report.to_string();
        assert!(output.contains("# Drill Unavailable"));
        assert!(output.contains("no input device available"));
    }

    #[test]
    fn test_settlement_display() {
        let credited = Settlement {
            user_id: "asha".to_string(),
            assignment_id: Some("asg-1".to_string()),
            credited_xp: 120,
            already_completed: false,
            progress: progress(1_120),
        };
        let output = credited.to_string();
        assert!(output.contains("**XP earned**: +120"));
        assert!(output.contains("**Total XP**: 1120 (Level 2)"));

        let skipped = Settlement {
            credited_xp: 0,
            already_completed: true,
            ..credited
        };
        assert!(skipped
            .to_string()
            .contains("Assignment asg-1 was already completed; no XP credited."));
    }

    #[test]
    fn test_progress_display() {
        let output = progress(1_250).to_string();
        assert!(output.contains("# Progress: asha"));
        assert!(output.contains("**Level**: 2"));
        assert!(output.contains("**XP**: 1250 (750 to next level)"));
    }

    #[test]
    fn test_assignment_entry_display() {
        let entry = AssignmentEntry {
            assignment: assignment(),
            status: Some(AssignmentStatus::Pending),
            completed_at: None,
            completions: 3,
        };
        let output = entry.to_string();
        assert!(output.contains("## Earthquake practice (ID: asg-1) ○ Pending"));
        assert!(output.contains("**Due**: 2026-11-01"));
        assert!(output.contains("**Completions**: 3"));

        let overview = AssignmentEntry {
            status: None,
            ..entry
        };
        assert!(overview
            .to_string()
            .starts_with("## Earthquake practice (ID: asg-1)\n"));
    }
}
