//! `restore` command

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::build_client;
use crate::config::Config;
use crate::restore::{self, RestoreOutcome, RestoreReport};
use crate::snapshot::load_snapshot;

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Snapshot file to restore
    pub snapshot: PathBuf,

    /// Write the per-row restore report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub async fn handle_restore_command(args: RestoreArgs, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let snapshot = load_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot: {}", args.snapshot.display()))?;

    println!(
        "Restoring {} products to store {}...",
        snapshot.len().to_string().bright_white().bold(),
        client.context().store_id.bright_green().bold()
    );
    let start = Instant::now();

    let outcome = restore::restore(&client, &snapshot)
        .await
        .context("Restore aborted")?;

    let report = match outcome {
        RestoreOutcome::NothingToRestore { ignored } => {
            println!(
                "{} Nothing to restore, {} products already match",
                "✓".green().bold(),
                ignored.len()
            );
            return Ok(());
        }
        RestoreOutcome::Executed(report) => report,
    };

    print_report(&report);

    if let Some(path) = &args.report {
        let body = serde_json::to_string_pretty(&report).context("Failed to serialize restore report")?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write restore report: {}", path.display()))?;
        println!("Report written to {}", path.display().to_string().cyan());
    }

    println!(
        "{}",
        format!("Completed in {:.2}s", start.elapsed().as_secs_f64()).dimmed()
    );

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} products had failed requests",
            report.failed_rows(),
            report.rows.len()
        );
    }
    Ok(())
}

fn print_report(report: &RestoreReport) {
    println!();
    for row in &report.rows {
        if row.is_success() {
            println!("  {} {:<6} {}", "✓".green(), row.action.to_string(), row.label);
            continue;
        }
        println!("  {} {:<6} {}", "✗".red().bold(), row.action.to_string(), row.label);
        for failure in row.failures() {
            let status = failure
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "no response".to_string());
            println!(
                "      {} {} [{}] {}",
                failure.operation.http_method(),
                failure.operation.path(),
                status.red(),
                failure.error.as_deref().unwrap_or_default().dimmed()
            );
        }
    }

    println!();
    println!(
        "{} products restored, {} with failures, {} unchanged ({} requests, {} failed)",
        report.succeeded_rows().to_string().green().bold(),
        report.failed_rows().to_string().red().bold(),
        report.ignored.len(),
        report.request_count(),
        report.failed_requests()
    );
}
