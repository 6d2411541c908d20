//! `snapshot` command

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::build_client;
use crate::config::Config;
use crate::snapshot::{capture, default_snapshot_path};

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Output file (defaults to "<store id> - Snapshot <date>.json" in the snapshot dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn handle_snapshot_command(args: SnapshotArgs, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let store_id = client.context().store_id.clone();

    let path = args
        .output
        .unwrap_or_else(|| default_snapshot_path(&config.snapshot_dir, &store_id));

    println!("Capturing catalog of store {}...", store_id.bright_green().bold());
    let start = Instant::now();

    let snapshot = capture(&client, Some(path.as_path()))
        .await
        .with_context(|| format!("Failed to capture snapshot of store {}", store_id))?;

    println!(
        "{} {} products ({} variants) saved to {}",
        "✓".green().bold(),
        snapshot.len().to_string().bright_white().bold(),
        snapshot.variant_count(),
        path.display().to_string().cyan()
    );
    println!(
        "{}",
        format!("Completed in {:.2}s", start.elapsed().as_secs_f64()).dimmed()
    );
    Ok(())
}
