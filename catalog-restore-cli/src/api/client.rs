//! Store API client
//!
//! `StoreContext` holds everything a run needs to talk to one store and is
//! built once per run, then handed to the fetcher and the restore executor.

use std::sync::Arc;

use serde_json::Value;

use super::resilience::ClusterConfig;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::Result;

pub const DEFAULT_API_BASE: &str = "https://api.tiendanube.com/v1";
pub const DEFAULT_USER_AGENT: &str = "catalog-restore (tech-support@tiendanube.com)";

/// Per-run connection settings
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub api_base: String,
    pub store_id: String,
    pub access_token: String,
    pub user_agent: String,
    pub cluster: ClusterConfig,
}

impl StoreContext {
    pub fn new(store_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            store_id: store_id.into(),
            access_token: access_token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cluster: ClusterConfig::default(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_cluster(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    /// Store root, e.g. `https://api.tiendanube.com/v1/3734860`
    pub fn store_url(&self) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), self.store_id)
    }

    /// Absolute URL for a store-relative path such as `/products`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.store_url(), path)
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authentication".to_string(), self.access_token.clone()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ]
    }
}

/// Client bound to one store
#[derive(Clone)]
pub struct StoreClient {
    context: StoreContext,
    transport: Arc<dyn Transport>,
}

impl StoreClient {
    pub fn new(context: StoreContext, transport: Arc<dyn Transport>) -> Self {
        Self { context, transport }
    }

    pub fn context(&self) -> &StoreContext {
        &self.context
    }

    /// Send a request to an absolute URL with the store headers attached
    pub async fn send(&self, method: Method, url: String, body: Option<Value>) -> Result<ApiResponse> {
        let request = ApiRequest {
            method,
            url,
            headers: self.context.headers(),
            body,
        };
        self.transport.send(request).await
    }

    pub async fn get(&self, url: String) -> Result<ApiResponse> {
        self.send(Method::Get, url, None).await
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("store_url", &self.context.store_url())
            .finish()
    }
}
