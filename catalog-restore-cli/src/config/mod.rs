//! Configuration
//!
//! Layers, lowest precedence first: `config.toml` in the user config
//! directory, `CATALOG_*` environment variables (a `.env` file is loaded into
//! the environment at startup), then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_API_BASE, DEFAULT_USER_AGENT, StoreContext};
use crate::api::resilience::ClusterConfig;
use crate::api::resilience::config::DEFAULT_MAX_CLUSTER_SIZE;

pub const ENV_STORE_ID: &str = "CATALOG_STORE_ID";
pub const ENV_ACCESS_TOKEN: &str = "CATALOG_ACCESS_TOKEN";
pub const ENV_API_BASE: &str = "CATALOG_API_BASE";
pub const ENV_CLUSTER_SIZE: &str = "CATALOG_CLUSTER_SIZE";
pub const ENV_SNAPSHOT_DIR: &str = "CATALOG_SNAPSHOT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_id: Option<String>,
    pub access_token: Option<String>,
    pub api_base: String,
    pub user_agent: String,
    pub cluster_size: usize,
    pub snapshot_dir: PathBuf,
    /// Per-request timeout in seconds, none when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_id: None,
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
            snapshot_dir: PathBuf::from("."),
            request_timeout_secs: None,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub store_id: Option<String>,
    pub access_token: Option<String>,
    pub api_base: Option<String>,
    pub cluster_size: Option<usize>,
    pub snapshot_dir: Option<PathBuf>,
}

impl Config {
    /// `<config_dir>/catalog-restore/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catalog-restore").join("config.toml"))
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// File, then process environment, then command-line overrides
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Apply `CATALOG_*` variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(store_id) = lookup(ENV_STORE_ID) {
            self.store_id = Some(store_id);
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(api_base) = lookup(ENV_API_BASE) {
            self.api_base = api_base;
        }
        if let Some(size) = lookup(ENV_CLUSTER_SIZE) {
            self.cluster_size = size
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got '{}'", ENV_CLUSTER_SIZE, size))?;
        }
        if let Some(dir) = lookup(ENV_SNAPSHOT_DIR) {
            self.snapshot_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(store_id) = overrides.store_id {
            self.store_id = Some(store_id);
        }
        if let Some(token) = overrides.access_token {
            self.access_token = Some(token);
        }
        if let Some(api_base) = overrides.api_base {
            self.api_base = api_base;
        }
        if let Some(size) = overrides.cluster_size {
            self.cluster_size = size;
        }
        if let Some(dir) = overrides.snapshot_dir {
            self.snapshot_dir = dir;
        }
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }

    /// Store connection settings; fails when credentials are missing
    pub fn to_context(&self) -> Result<StoreContext> {
        let store_id = self
            .store_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .with_context(|| format!("No store id configured. Pass --store-id or set {}", ENV_STORE_ID))?;
        let token = self
            .access_token
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .with_context(|| {
                format!("No access token configured. Pass --token or set {}", ENV_ACCESS_TOKEN)
            })?;

        Ok(StoreContext::new(store_id.trim(), token.trim())
            .with_api_base(self.api_base.clone())
            .with_user_agent(self.user_agent.clone())
            .with_cluster(ClusterConfig::new(self.cluster_size)))
    }
}
