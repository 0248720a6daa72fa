//! Command-line argument definitions using clap's derive API.
//!
//! Argument structs stay free of core logic: each converts into the matching
//! `kawach_core::params` type with a `From` impl, so the CLI and the MCP
//! server share one set of parameters.
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Arena
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use kawach_core::params::{
    CompleteAssignment, CreateAssignment, ListAssignments, PlayScenario, RunArDrill, ScenarioId,
    UserId,
};

/// Kawach: disaster-preparedness drills with XP and assignments
///
/// Play branching earthquake, fire and flood scenarios, run the timed
/// drop-cover-hold-evacuate drill, and track learner progress. `kawach serve`
/// exposes the same operations to AI assistants over MCP.
#[derive(Parser)]
#[command(version, about, name = "kawach")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/kawach/kawach.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Directory of extra scenario JSON files, merged over the built-in ones
    #[arg(long, global = true)]
    pub scenario_dir: Option<PathBuf>,

    /// JSON file overriding drill pacing, scoring and hazards
    #[arg(long, global = true)]
    pub drill_config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands. Without a command the scenario catalogue is listed.
#[derive(Subcommand)]
pub enum Commands {
    /// Browse the scenario catalogue
    #[command(alias = "sc")]
    Scenario {
        #[command(subcommand)]
        command: ScenarioCommands,
    },
    /// Play a branching scenario drill with a list of answers
    #[command(alias = "d")]
    Drill(DrillArgs),
    /// Run the timed drop-cover-hold-evacuate drill from a script
    #[command(alias = "ar")]
    ArDrill(ArDrillArgs),
    /// Show a learner's XP and level
    #[command(alias = "p")]
    Progress(ProgressArgs),
    /// Manage assignments
    #[command(alias = "a")]
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommands,
    },
    /// Start the MCP server
    Serve,
}

#[derive(Subcommand)]
pub enum ScenarioCommands {
    /// List all scenarios
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show the steps and options of a scenario
    #[command(alias = "s")]
    Show(ShowScenarioArgs),
}

/// Show a scenario without revealing its answers
#[derive(ClapArgs)]
pub struct ShowScenarioArgs {
    #[arg(help = "Scenario ID, e.g. earthquake-library-drill")]
    pub id: String,
}

impl From<ShowScenarioArgs> for ScenarioId {
    fn from(val: ShowScenarioArgs) -> Self {
        ScenarioId { id: val.id }
    }
}

/// Play a branching drill
#[derive(ClapArgs)]
pub struct DrillArgs {
    #[arg(help = "Scenario ID to play")]
    pub scenario_id: String,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        required = true,
        help = "0-indexed option for each step as a comma-separated list, e.g. 1,0,2"
    )]
    pub answers: Vec<usize>,
    #[arg(short, long, help = "Learner to credit with the XP")]
    pub user: Option<String>,
    #[arg(long, help = "Assignment this run completes (requires --user)")]
    pub assignment: Option<String>,
}

impl From<DrillArgs> for PlayScenario {
    fn from(val: DrillArgs) -> Self {
        PlayScenario {
            scenario_id: val.scenario_id,
            answers: val.answers,
            user_id: val.user,
            assignment_id: val.assignment,
        }
    }
}

/// Run the timed drill on a virtual clock
///
/// The learner takes cover `--reaction` seconds after the shaking starts,
/// holds through the countdown and evacuates `--evacuation` seconds after it
/// ends. Cover taken while still shaking counts once the shaking stops.
#[derive(ClapArgs)]
pub struct ArDrillArgs {
    #[arg(long, help = "Seconds from shake onset to taking cover (default 1.0)")]
    pub reaction: Option<f64>,
    #[arg(long, help = "Seconds from the end of the countdown to evacuating (default 2.0)")]
    pub evacuation: Option<f64>,
    #[arg(long, help = "Briefly leave cover when the countdown reaches this value")]
    pub release_at: Option<u32>,
    #[arg(
        long = "tap-hazard",
        value_name = "ID",
        help = "Tap a hazard (window, shelf) while holding cover; repeatable"
    )]
    pub tap_hazard: Vec<String>,
    #[arg(long, help = "Simulate a missing camera or sensor")]
    pub no_device: bool,
    #[arg(short, long, help = "Learner to credit with the XP")]
    pub user: Option<String>,
    #[arg(long, help = "Assignment this run completes (requires --user)")]
    pub assignment: Option<String>,
}

impl From<ArDrillArgs> for RunArDrill {
    fn from(val: ArDrillArgs) -> Self {
        RunArDrill {
            reaction_secs: val.reaction,
            evacuation_secs: val.evacuation,
            release_at_countdown: val.release_at,
            hazard_taps: val.tap_hazard,
            device_available: !val.no_device,
            user_id: val.user,
            assignment_id: val.assignment,
        }
    }
}

#[derive(ClapArgs)]
pub struct ProgressArgs {
    #[arg(help = "Learner ID")]
    pub user_id: String,
}

impl From<ProgressArgs> for UserId {
    fn from(val: ProgressArgs) -> Self {
        UserId {
            user_id: val.user_id,
        }
    }
}

#[derive(Subcommand)]
pub enum AssignmentCommands {
    /// Create an assignment
    #[command(alias = "c")]
    Create(CreateAssignmentArgs),
    /// List assignments
    #[command(aliases = ["l", "ls"])]
    List(ListAssignmentsArgs),
    /// Record a quiz or module assignment as completed
    #[command(alias = "done")]
    Complete(CompleteAssignmentArgs),
}

/// Create an assignment for learners
#[derive(ClapArgs)]
pub struct CreateAssignmentArgs {
    /// Title shown to learners
    pub title: String,
    #[arg(short, long, value_enum, help = "Kind of work")]
    pub kind: AssignmentKindArg,
    #[arg(
        short,
        long,
        help = "Scenario ID for drills, earthquake-ar-drill for AR drills, or a quiz/module ID"
    )]
    pub content: String,
    #[arg(long, help = "Teacher setting the assignment")]
    pub assigned_by: String,
    #[arg(long, help = "Due date as YYYY-MM-DD")]
    pub due: Option<String>,
    #[arg(long, help = "Assignment ID (generated when omitted)")]
    pub id: Option<String>,
}

impl From<CreateAssignmentArgs> for CreateAssignment {
    fn from(val: CreateAssignmentArgs) -> Self {
        CreateAssignment {
            id: val.id,
            title: val.title,
            kind: val.kind.to_string(),
            content_id: val.content,
            due_date: val.due,
            assigned_by: val.assigned_by,
        }
    }
}

#[derive(ClapArgs)]
pub struct ListAssignmentsArgs {
    #[arg(short, long, help = "Show completion status for this learner")]
    pub user: Option<String>,
}

impl From<ListAssignmentsArgs> for ListAssignments {
    fn from(val: ListAssignmentsArgs) -> Self {
        ListAssignments { user_id: val.user }
    }
}

#[derive(ClapArgs)]
pub struct CompleteAssignmentArgs {
    #[arg(help = "ID of the assignment")]
    pub assignment_id: String,
    #[arg(short, long, help = "Learner who completed it")]
    pub user: String,
    #[arg(long, default_value_t = 0, help = "XP earned, e.g. the quiz score")]
    pub xp: u32,
}

impl From<CompleteAssignmentArgs> for CompleteAssignment {
    fn from(val: CompleteAssignmentArgs) -> Self {
        CompleteAssignment {
            user_id: val.user,
            assignment_id: val.assignment_id,
            xp: val.xp,
        }
    }
}

/// Command-line representation of assignment kinds.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum AssignmentKindArg {
    /// Branching scenario drill
    Drill,
    /// Timed AR earthquake drill
    ArDrill,
    /// Quiz
    Quiz,
    /// Learning module
    Module,
}

impl std::fmt::Display for AssignmentKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentKindArg::Drill => write!(f, "drill"),
            AssignmentKindArg::ArDrill => write!(f, "ar_drill"),
            AssignmentKindArg::Quiz => write!(f, "quiz"),
            AssignmentKindArg::Module => write!(f, "module"),
        }
    }
}
