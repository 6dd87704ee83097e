// esg-core/src/bin/snapshot_export.rs
// One tick per configured panel, written out as a combined record file

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dotenvy::dotenv;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use esg_core::analytics::export::{write_records, ExportFormat};
use esg_core::analytics::{RngVariation, Snapshot};
use esg_core::config::Settings;
use esg_core::live::{SchedulerConfig, SessionRegistry, TickBudget};
use esg_core::render::ChannelRenderer;
use esg_core::service::{AppState, ServiceError};

/// Run one tick per configured panel and write the combined records.
#[derive(Parser, Debug)]
#[command(name = "snapshot_export")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file; `.jsonl` / `.ndjson` write JSON Lines, anything else a JSON array
    #[arg(default_value = "esg_data.json")]
    output: String,

    /// Seed the variation source for a reproducible export
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let state = AppState::new(Settings::new()?).context("Failed to load ESG dataset")?;
    let plans = state.panel_plans()?;

    let config = SchedulerConfig {
        budget: TickBudget::Bounded(1),
        delay: Duration::ZERO,
        ..state.settings.scheduler_config()
    };
    let registry = SessionRegistry::new(state.dataset.clone(), config);

    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(plans.len());
    for (i, plan) in plans.iter().enumerate() {
        let (renderer, mut rx) = ChannelRenderer::pair(1);
        let renderer = renderer.named(format!("export:{}", plan.category));
        let variation = match args.seed {
            Some(seed) => RngVariation::seeded(seed.wrapping_add(i as u64)),
            None => RngVariation::from_entropy(),
        };

        let session = registry.open(plan.category, plan.selection.clone(), Box::new(renderer), variation);
        let snapshot = rx.recv().await.context("Panel produced no snapshot")?;
        let report = session.task.await.map_err(ServiceError::from)?;
        info!(
            "{} [{}]: {} records, {:?}",
            report.category,
            report.selection,
            snapshot.records.len(),
            report.state
        );
        snapshots.push(snapshot);
    }

    let format = ExportFormat::from_path(&args.output);
    let file = File::create(&args.output).with_context(|| format!("Failed to create {}", args.output))?;
    let mut writer = BufWriter::new(file);
    let written = write_records(&mut writer, &snapshots, format)?;
    writer.flush()?;

    info!(
        "Exported {} records from {} panels to {} at {}",
        written,
        snapshots.len(),
        args.output,
        Utc::now().to_rfc3339()
    );
    Ok(())
}
