// esg-core/src/bin/dashboard/main.rs
// ESG Live Dashboard - terminal front end
// One ticking panel per configured category; stdin drives the selections

mod modules;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::io::BufRead;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use esg_core::analytics::RngVariation;
use esg_core::config::Settings;
use esg_core::live::SessionId;
use esg_core::render::ConsoleRenderer;
use esg_core::service::{AppState, ServiceError};
use modules::commands::{self, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Frames go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let settings = Settings::new().context("Failed to load dashboard configuration")?;
    let state = Arc::new(AppState::new(settings).context("Failed to load ESG dataset")?);
    let plans = state.panel_plans()?;
    let table_rows = state.settings.render.table_rows;

    let mut handles = Vec::with_capacity(plans.len());
    for plan in &plans {
        info!("Panel {}: {:?} mode on {}", plan.category, plan.selection.mode(), plan.selection);
        let renderer = ConsoleRenderer::stdout(plan.category.theme(), table_rows);
        handles.push(state.open_panel(plan, Box::new(renderer), RngVariation::from_entropy()));
    }
    let panel_ids: Vec<SessionId> = handles.iter().map(|h| h.id).collect();
    info!("Dashboard live: {} panels | {}", panel_ids.len(), commands::USAGE);

    let registry = state.registry.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            registry.close_all();
        }
    });

    tokio::spawn(command_loop(state.clone(), panel_ids));

    for handle in handles {
        let report = handle.task.await.map_err(ServiceError::from)?;
        info!(
            "Panel {} ({}) [{}] finished {:?} after {} ticks",
            report.id, report.category, report.selection, report.state, report.ticks
        );
    }

    Ok(())
}

/// Stdin is read on a plain thread so a pending read never holds up
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

async fn command_loop(state: Arc<AppState>, panel_ids: Vec<SessionId>) {
    let mut lines = spawn_stdin_reader();

    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                warn!("{}", msg);
                continue;
            }
        };

        match command {
            Command::Select { panel, selection } => match panel_ids.get(panel) {
                Some(id) => {
                    if !state.registry.select(*id, selection) {
                        warn!("Panel {} is no longer running", panel);
                    }
                }
                None => warn!("No panel {} (have {})", panel, panel_ids.len()),
            },
            Command::Close { panel } => match panel_ids.get(panel) {
                Some(id) => {
                    state.registry.close(*id);
                }
                None => warn!("No panel {} (have {})", panel, panel_ids.len()),
            },
            Command::Options { entity } => {
                let options = state.options(entity.as_deref());
                match serde_json::to_string_pretty(&options) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Failed to serialise options: {}", e),
                }
            }
            Command::Quit => {
                state.registry.close_all();
                break;
            }
        }
    }
}
