//! Command handlers for the terminal shell.
//!
//! Each handler converts clap arguments into core parameters, calls the
//! [`Arena`] and renders the resulting markdown.

use anyhow::{Context, Result};
use kawach_core::{
    display::OperationStatus,
    params::{ListAssignments, ScenarioId},
    Arena,
};
use log::debug;

use crate::{
    args::{ArDrillArgs, AssignmentCommands, DrillArgs, ProgressArgs, ScenarioCommands},
    renderer::TerminalRenderer,
};

/// Runs CLI commands against an arena.
pub struct Cli {
    arena: Arena,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(arena: Arena, renderer: TerminalRenderer) -> Self {
        Self { arena, renderer }
    }

    pub fn list_scenarios(&self) -> Result<()> {
        let scenarios = self.arena.list_scenarios();
        debug!("Listing {} scenario(s)", scenarios.len());
        self.renderer.render(&scenarios.to_string())
    }

    pub fn handle_scenario_command(&self, command: ScenarioCommands) -> Result<()> {
        match command {
            ScenarioCommands::List => self.list_scenarios(),
            ScenarioCommands::Show(args) => {
                let params = ScenarioId::from(args);
                let scenario = self
                    .arena
                    .show_scenario(&params)
                    .with_context(|| format!("Failed to show scenario '{}'", params.id))?;
                self.renderer.render(&scenario.to_string())
            }
        }
    }

    pub async fn play_drill(&self, args: DrillArgs) -> Result<()> {
        let report = self
            .arena
            .play_scenario(&args.into())
            .await
            .context("Failed to play drill")?;
        self.renderer.render(&report.to_string())
    }

    pub async fn run_ar_drill(&self, args: ArDrillArgs) -> Result<()> {
        let report = self
            .arena
            .run_ar_drill(&args.into())
            .await
            .context("Failed to run AR drill")?;
        self.renderer.render(&report.to_string())
    }

    pub async fn show_progress(&self, args: ProgressArgs) -> Result<()> {
        let progress = self
            .arena
            .progress(&args.into())
            .await
            .context("Failed to load progress")?;
        self.renderer.render(&progress.to_string())
    }

    pub async fn handle_assignment_command(&self, command: AssignmentCommands) -> Result<()> {
        match command {
            AssignmentCommands::Create(args) => {
                let assignment = self
                    .arena
                    .create_assignment(&args.into())
                    .await
                    .context("Failed to create assignment")?;
                let status =
                    OperationStatus::success(format!("Created assignment {}", assignment.id));
                self.renderer.render(&format!("{status}\n{assignment}"))
            }
            AssignmentCommands::List(args) => {
                let params = ListAssignments::from(args);
                let entries = self
                    .arena
                    .list_assignments(&params)
                    .await
                    .context("Failed to list assignments")?;
                self.renderer.render(&entries.to_string())
            }
            AssignmentCommands::Complete(args) => {
                let settlement = self
                    .arena
                    .complete_assignment(&args.into())
                    .await
                    .context("Failed to complete assignment")?;
                self.renderer.render(&settlement.to_string())
            }
        }
    }
}
