//! Catalog Fetcher
//!
//! Page 1 is requested alone; its `Link` header yields the remaining page
//! URLs, which are fetched through the clustered runner in strict mode. A
//! single failing page aborts the whole fetch and no partial catalog is
//! returned.

use log::{debug, info};
use serde_json::Value;

use crate::api::client::StoreClient;
use crate::api::models::Product;
use crate::api::pagination;
use crate::api::resilience::ClusterRunner;
use crate::api::transport::ApiResponse;
use crate::error::{RestoreError, Result};

pub struct CatalogFetcher<'a> {
    client: &'a StoreClient,
    runner: ClusterRunner,
}

impl<'a> CatalogFetcher<'a> {
    pub fn new(client: &'a StoreClient) -> Self {
        Self {
            runner: ClusterRunner::new(client.context().cluster),
            client,
        }
    }

    /// Fetch every product page and concatenate them into one catalog
    pub async fn fetch_all(&self) -> Result<Vec<Product>> {
        let first_url = self.client.context().url("/products");
        let first = self.fetch_response(&first_url).await?;

        let remaining = match first.header("link") {
            Some(link) => pagination::page_urls(link)?,
            None => Vec::new(),
        };
        let mut catalog = parse_page(&first_url, first.body)?;
        debug!("page 1 returned {} products, {} pages remain", catalog.len(), remaining.len());

        let pages = self
            .runner
            .run("fetch", remaining, |url: String| async move {
                let response = self.fetch_response(&url).await?;
                parse_page(&url, response.body)
            })
            .await?;

        catalog.extend(pages.into_iter().flatten());
        info!("Fetched {} products from {}", catalog.len(), self.client.context().store_url());
        Ok(catalog)
    }

    async fn fetch_response(&self, url: &str) -> Result<ApiResponse> {
        let response = self.client.get(url.to_string()).await?;
        if !response.is_success() {
            return Err(RestoreError::UpstreamFetch {
                url: url.to_string(),
                status: response.status,
                body: response.body_text(),
            });
        }
        Ok(response)
    }
}

/// Fetch the complete live catalog for the client's store
pub async fn fetch_catalog(client: &StoreClient) -> Result<Vec<Product>> {
    CatalogFetcher::new(client).fetch_all().await
}

fn parse_page(url: &str, body: Value) -> Result<Vec<Product>> {
    serde_json::from_value(body).map_err(|e| RestoreError::invalid_document(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::StoreContext;
    use crate::api::models::fixtures::product;
    use crate::api::pagination::page_number;
    use crate::api::resilience::ClusterConfig;
    use crate::api::transport::mock::{MockTransport, json_response, with_link};
    use serde_json::json;
    use std::sync::Arc;

    const LINK: &str = "<https://api.tiendanube.com/v1/1/products?page=2>; rel=\"next\", \
                        <https://api.tiendanube.com/v1/1/products?page=4>; rel=\"last\"";

    fn page_body(page: u32) -> Value {
        json!([product(u64::from(page) * 100, &[u64::from(page)])])
    }

    fn client(transport: Arc<MockTransport>) -> StoreClient {
        let context = StoreContext::new("1", "token").with_cluster(ClusterConfig::new(2));
        StoreClient::new(context, transport)
    }

    #[tokio::test]
    async fn test_fetch_all_pages() {
        let transport = Arc::new(MockTransport::new(|req| {
            Ok(match page_number(&req.url) {
                None => with_link(json_response(200, page_body(1)), LINK),
                Some(page) => json_response(200, page_body(page)),
            })
        }));
        let client = client(transport.clone());

        let catalog = fetch_catalog(&client).await.unwrap();

        let mut ids: Vec<u64> = catalog.iter().map(|p| p.id.get()).collect();
        ids.sort();
        assert_eq!(ids, vec![100, 200, 300, 400]);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls[0], "https://api.tiendanube.com/v1/1/products");
        assert_eq!(urls.len(), 4);
    }

    #[tokio::test]
    async fn test_single_page_without_link_header() {
        let transport = Arc::new(MockTransport::new(|_| Ok(json_response(200, page_body(1)))));
        let catalog = fetch_catalog(&client(transport.clone())).await.unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_first_page_failure() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json_response(401, json!({"code": 401, "message": "Unauthorized"})))
        }));
        let err = fetch_catalog(&client(transport.clone())).await.unwrap_err();

        assert!(matches!(err, RestoreError::UpstreamFetch { status: 401, .. }));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_page_aborts_whole_fetch() {
        let transport = Arc::new(MockTransport::new(|req| {
            Ok(match page_number(&req.url) {
                None => with_link(json_response(200, page_body(1)), LINK),
                Some(3) => json_response(500, json!("Internal Server Error")),
                Some(page) => json_response(200, page_body(page)),
            })
        }));

        let err = fetch_catalog(&client(transport)).await.unwrap_err();
        match err {
            RestoreError::UpstreamFetch { url, status, body } => {
                assert!(url.ends_with("page=3"));
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_link_header() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(with_link(json_response(200, page_body(1)), "not a link header"))
        }));
        let err = fetch_catalog(&client(transport)).await.unwrap_err();
        assert!(matches!(err, RestoreError::MalformedPagination { .. }));
    }

    #[tokio::test]
    async fn test_invalid_page_body() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json_response(200, json!([{"id": 0, "variants": []}])))
        }));
        let err = fetch_catalog(&client(transport)).await.unwrap_err();
        assert!(matches!(err, RestoreError::InvalidDocument { .. }));
    }
}
