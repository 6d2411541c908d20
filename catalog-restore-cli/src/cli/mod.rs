//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;
use commands::plan::PlanArgs;
use commands::restore::RestoreArgs;
use commands::snapshot::SnapshotArgs;

#[derive(Debug, Parser)]
#[command(name = "catalog-restore", version, about = "Capture store catalog snapshots and restore them")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command; they take precedence over env and config file
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Store id on the platform
    #[arg(long, global = true)]
    pub store_id: Option<String>,

    /// API access token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Maximum concurrent requests per cluster
    #[arg(long, global = true)]
    pub cluster_size: Option<usize>,

    /// Directory for default-named snapshot files
    #[arg(long, global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Config file (defaults to <config dir>/catalog-restore/config.toml)
    #[arg(long, global = true, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            store_id: self.store_id.clone(),
            access_token: self.token.clone(),
            api_base: self.api_base.clone(),
            cluster_size: self.cluster_size,
            snapshot_dir: self.snapshot_dir.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch the live catalog and save it as a snapshot file
    Snapshot(SnapshotArgs),
    /// Restore the store to the state of a snapshot file
    Restore(RestoreArgs),
    /// Show what a restore would do without writing anything
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_parse_restore_with_global_flags() {
        let cli = Cli::try_parse_from([
            "catalog-restore",
            "restore",
            "backup.json",
            "--store-id",
            "3734860",
            "--cluster-size",
            "10",
            "--report",
            "out.json",
        ])
        .unwrap();

        let overrides = cli.global.overrides();
        assert_eq!(overrides.store_id.as_deref(), Some("3734860"));
        assert_eq!(overrides.cluster_size, Some(10));
        match cli.command {
            Commands::Restore(args) => {
                assert_eq!(args.snapshot, PathBuf::from("backup.json"));
                assert_eq!(args.report, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_requires_no_args() {
        let cli = Cli::try_parse_from(["catalog-restore", "snapshot"]).unwrap();
        assert!(matches!(cli.command, Commands::Snapshot(SnapshotArgs { output: None, .. })));
    }

    #[test]
    fn test_snapshot_dir_flag_reaches_overrides() {
        let cli = Cli::try_parse_from(["catalog-restore", "snapshot", "--snapshot-dir", "/tmp/backups"]).unwrap();
        let mut config = Config::default();
        config.apply_overrides(cli.global.overrides());
        assert_eq!(config.snapshot_dir, PathBuf::from("/tmp/backups"));
    }

    #[test]
    fn test_plan_requires_snapshot_path() {
        assert!(Cli::try_parse_from(["catalog-restore", "plan"]).is_err());
    }
}
