//! Kawach CLI
//!
//! Terminal shell and MCP server for the Kawach disaster-preparedness
//! trainer.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use kawach_core::ArenaBuilder;
use log::info;
use mcp::{run_stdio_server, KawachMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        scenario_dir,
        drill_config,
        no_color,
        command,
    } = Args::parse();

    let arena = ArenaBuilder::new()
        .with_database_path(database_file)
        .with_scenario_dir(scenario_dir)
        .with_settings_file(drill_config)
        .build()
        .await
        .context("Failed to initialize Kawach")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Kawach started");

    match command {
        Some(Scenario { command }) => Cli::new(arena, renderer).handle_scenario_command(command),
        Some(Drill(args)) => Cli::new(arena, renderer).play_drill(args).await,
        Some(ArDrill(args)) => Cli::new(arena, renderer).run_ar_drill(args).await,
        Some(Progress(args)) => Cli::new(arena, renderer).show_progress(args).await,
        Some(Assignment { command }) => {
            Cli::new(arena, renderer)
                .handle_assignment_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting Kawach MCP server");
            run_stdio_server(KawachMcpServer::new(arena))
                .await
                .context("MCP server failed")
        }
        None => Cli::new(arena, renderer).list_scenarios(),
    }
}
