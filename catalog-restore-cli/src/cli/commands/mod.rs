//! Command handlers

pub mod plan;
pub mod restore;
pub mod snapshot;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::client::StoreClient;
use crate::api::transport::HttpTransport;
use crate::config::Config;

/// Build the store client for a run from resolved configuration
pub fn build_client(config: &Config) -> Result<StoreClient> {
    let context = config.to_context()?;
    let transport = HttpTransport::new(config.request_timeout()).context("Failed to create HTTP client")?;
    Ok(StoreClient::new(context, Arc::new(transport)))
}
