//! HTTP transport seam
//!
//! The engine only needs GET/PUT/POST with headers and JSON bodies, and a
//! response carrying status, headers and the parsed body. `HttpTransport`
//! provides that over reqwest; tests swap in `MockTransport`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RestoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    /// Parsed JSON body, or the raw text as a JSON string when it isn't JSON
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body rendered as text, for error messages
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Minimal request/response contract the engine depends on
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| RestoreError::Transport {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        log::debug!("{} {}", request.method, request.url);

        let transport_error = |e: reqwest::Error| RestoreError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let text = response.text().await.map_err(transport_error)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        log::debug!("{} {} -> {}", request.method, request.url, status);

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted transport for engine tests

    use std::sync::Mutex;

    use super::*;

    type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync>;

    /// Records every request and answers through a closure
    pub struct MockTransport {
        responder: Responder,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl MockTransport {
        pub fn new(
            responder: impl Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Answer every request with `200 {}`
        pub fn ok() -> Self {
            Self::new(|_| Ok(json_response(200, serde_json::json!({}))))
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request.clone());
            // Yield so sibling requests in a cluster interleave
            tokio::task::yield_now().await;
            (self.responder)(&request)
        }
    }

    pub fn json_response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_link(mut response: ApiResponse, link: &str) -> ApiResponse {
        response.headers.insert("link".to_string(), link.to_string());
        response
    }
}
