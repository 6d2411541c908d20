mod api;
mod catalog;
mod cli;
mod config;
mod error;
mod restore;
mod snapshot;

use anyhow::Result;
use clap::Parser;

use cli::commands::{plan::handle_plan_command, restore::handle_restore_command, snapshot::handle_snapshot_command};
use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if cli.global.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.global.config.as_deref(), cli.global.overrides())?;
    log::debug!("Using API base {}", config.api_base);

    match cli.command {
        Commands::Snapshot(args) => handle_snapshot_command(args, &config).await,
        Commands::Restore(args) => handle_restore_command(args, &config).await,
        Commands::Plan(args) => handle_plan_command(args, &config).await,
    }
}
