//! `plan` command: resolve a snapshot against the live store without writing

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use super::build_client;
use crate::config::Config;
use crate::restore::{self, ActionPlan, RecordAction};
use crate::snapshot::load_snapshot;

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Snapshot file to compare against the live catalog
    pub snapshot: PathBuf,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Also list products that need no changes
    #[arg(long)]
    pub show_ignored: bool,
}

pub async fn handle_plan_command(args: PlanArgs, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let snapshot = load_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot: {}", args.snapshot.display()))?;

    let plan = restore::plan(&client, &snapshot)
        .await
        .context("Failed to build restore plan")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?
        );
        return Ok(());
    }

    print_plan(&plan, args.show_ignored);
    Ok(())
}

pub fn print_plan(plan: &ActionPlan, show_ignored: bool) {
    println!();
    for row in &plan.actions {
        let action = match row.action {
            RecordAction::Create => row.action.to_string().green().bold(),
            RecordAction::Update => row.action.to_string().yellow().bold(),
            RecordAction::Ignore => row.action.to_string().dimmed(),
        };
        println!("  {:<8} {}", action, row.label);
        if !row.missing_variant_ids.is_empty() {
            let ids: Vec<String> = row.missing_variant_ids.iter().map(|id| id.to_string()).collect();
            let note = match row.action {
                RecordAction::Create => "with variants",
                _ => "recreate variants",
            };
            println!("           {} {}", note.dimmed(), ids.join(", "));
        }
    }
    if show_ignored {
        for row in &plan.ignored {
            println!("  {:<8} {}", row.action.to_string().dimmed(), row.label.dimmed());
        }
    }

    println!();
    println!(
        "{} to create, {} to update, {} unchanged ({} requests)",
        plan.create_count().to_string().green().bold(),
        plan.update_count().to_string().yellow().bold(),
        plan.ignore_count().to_string().dimmed(),
        plan.request_count()
    );
}
