//! MCP server for Kawach
//!
//! Exposes the drill, progress and assignment operations as Model Context
//! Protocol tools over stdio. Tool parameters are the core parameter types;
//! their JSON schema comes from the `schema` feature of `kawach-core`.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use kawach_core::{
    display::OperationStatus,
    params::{
        CompleteAssignment, CreateAssignment, ListAssignments, PlayScenario, RunArDrill,
        ScenarioId, UserId,
    },
    Arena,
};
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;

use errors::to_mcp_error;

pub type McpResult = Result<CallToolResult, McpError>;

fn text_result(markdown: String) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(markdown)]))
}

/// MCP server for Kawach
#[derive(Clone)]
pub struct KawachMcpServer {
    arena: Arc<Arena>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KawachMcpServer {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena: Arc::new(arena),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "list_scenarios",
        description = "List the branching safety drills (earthquake, fire, flood) with their IDs, number of steps and maximum score."
    )]
    async fn list_scenarios(&self) -> McpResult {
        text_result(self.arena.list_scenarios().to_string())
    }

    #[tool(
        name = "show_scenario",
        description = "Show every step of a scenario with its numbered options. Correct answers are not revealed. Option numbers are 0-indexed and are what play_scenario expects."
    )]
    async fn show_scenario(&self, Parameters(params): Parameters<ScenarioId>) -> McpResult {
        debug!("show_scenario: {params:?}");
        let scenario = self
            .arena
            .show_scenario(&params)
            .map_err(|e| to_mcp_error("Failed to show scenario", &e))?;
        text_result(scenario.to_string())
    }

    #[tool(
        name = "play_scenario",
        description = "Play a branching drill by giving one 0-indexed option per step. Returns the feedback for each choice and the score (reward per correct answer). With user_id the score is credited as XP; with assignment_id as well, the assignment is completed, and a repeated completion credits nothing."
    )]
    async fn play_scenario(&self, Parameters(params): Parameters<PlayScenario>) -> McpResult {
        debug!("play_scenario: {params:?}");
        let report = self
            .arena
            .play_scenario(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to play scenario", &e))?;
        text_result(report.to_string())
    }

    #[tool(
        name = "run_ar_drill",
        description = "Run the timed drop-cover-hold-evacuate earthquake drill from a script on a virtual clock. reaction_secs is when the learner takes cover after the shaking starts, evacuation_secs is how long they take to evacuate after the countdown. release_at_countdown makes them leave cover once, which resets the countdown. Returns reaction and evacuation ratings and XP (reaction + cover + evacuation)."
    )]
    async fn run_ar_drill(&self, Parameters(params): Parameters<RunArDrill>) -> McpResult {
        debug!("run_ar_drill: {params:?}");
        let report = self
            .arena
            .run_ar_drill(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to run AR drill", &e))?;
        text_result(report.to_string())
    }

    #[tool(
        name = "show_progress",
        description = "Show a learner's total XP, level (every 1000 XP) and number of completed assignments."
    )]
    async fn show_progress(&self, Parameters(params): Parameters<UserId>) -> McpResult {
        let progress = self
            .arena
            .progress(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to load progress", &e))?;
        text_result(progress.to_string())
    }

    #[tool(
        name = "create_assignment",
        description = "Create an assignment. kind is 'drill' (content_id is a scenario ID), 'ar_drill' (content_id 'earthquake-ar-drill'), 'quiz' or 'module'. due_date is YYYY-MM-DD."
    )]
    async fn create_assignment(
        &self,
        Parameters(params): Parameters<CreateAssignment>,
    ) -> McpResult {
        debug!("create_assignment: {params:?}");
        let assignment = self
            .arena
            .create_assignment(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to create assignment", &e))?;
        let status = OperationStatus::success(format!("Created assignment {}", assignment.id));
        text_result(format!("{status}\n{assignment}"))
    }

    #[tool(
        name = "list_assignments",
        description = "List assignments in creation order. With user_id, each shows whether that learner completed it."
    )]
    async fn list_assignments(
        &self,
        Parameters(params): Parameters<ListAssignments>,
    ) -> McpResult {
        let entries = self
            .arena
            .list_assignments(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to list assignments", &e))?;
        text_result(entries.to_string())
    }

    #[tool(
        name = "complete_assignment",
        description = "Record a quiz or module assignment as completed by a learner and credit its XP. Drill assignments are completed through play_scenario or run_ar_drill instead."
    )]
    async fn complete_assignment(
        &self,
        Parameters(params): Parameters<CompleteAssignment>,
    ) -> McpResult {
        debug!("complete_assignment: {params:?}");
        let settlement = self
            .arena
            .complete_assignment(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to complete assignment", &e))?;
        text_result(settlement.to_string())
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for KawachMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "kawach".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"Kawach is a disaster-preparedness trainer. Learners earn XP by playing safety drills; teachers set assignments.

## Drills
- **Branching scenarios**: `list_scenarios`, then `show_scenario` to read the steps, then `play_scenario` with one option index per step.
- **Timed AR drill**: `run_ar_drill` simulates drop, cover, hold and evacuate. Faster reaction and evacuation earn more XP.

## Progress
- XP accumulates per learner; every 1000 XP is a level. Use `show_progress`.
- Pass `user_id` to a drill to credit its XP, and `assignment_id` to complete an assignment. An assignment credits XP only once.

## Assignments
- `create_assignment`, `list_assignments` (with `user_id` for status) and `complete_assignment` for quizzes and modules."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: KawachMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Kawach MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
