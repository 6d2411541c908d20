//! Core Operation types for catalog writes

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client::StoreClient;
use crate::api::transport::{ApiResponse, Method};

/// A single write against the store's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Recreate a product that no longer exists
    /// POST /products
    CreateProduct {
        /// Id the product had in the snapshot (the store assigns a new one)
        source_id: NonZeroU64,
        /// CREATE-projected product, variants embedded
        data: Value,
    },
    /// Overwrite an existing product's fields
    /// PUT /products/{id}
    UpdateProduct {
        id: NonZeroU64,
        /// UPDATE-projected product without `id` and `variants`
        data: Value,
    },
    /// Overwrite every known variant of a product in one call
    /// PUT /products/{product_id}/variants
    UpdateVariants {
        product_id: NonZeroU64,
        /// Array of UPDATE-projected variants without `product_id`
        data: Value,
    },
    /// Recreate one variant that is missing from a live product
    /// POST /products/{product_id}/variants
    CreateVariant {
        product_id: NonZeroU64,
        /// Id the variant had in the snapshot
        source_variant_id: NonZeroU64,
        /// CREATE-projected variant without `product_id`
        data: Value,
    },
}

/// Result of executing an Operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The operation that was executed
    pub operation: Operation,
    /// Whether the store answered with a 2xx status
    pub success: bool,
    /// HTTP status code, None when no response arrived
    pub status_code: Option<u16>,
    /// Response body as returned by the store
    pub data: Option<Value>,
    /// Transport failure or error body text
    pub error: Option<String>,
}

impl Operation {
    pub fn create_product(source_id: NonZeroU64, data: Value) -> Self {
        Self::CreateProduct { source_id, data }
    }

    pub fn update_product(id: NonZeroU64, data: Value) -> Self {
        Self::UpdateProduct { id, data }
    }

    pub fn update_variants(product_id: NonZeroU64, data: Value) -> Self {
        Self::UpdateVariants { product_id, data }
    }

    pub fn create_variant(product_id: NonZeroU64, source_variant_id: NonZeroU64, data: Value) -> Self {
        Self::CreateVariant {
            product_id,
            source_variant_id,
            data,
        }
    }

    /// Product this operation belongs to (snapshot id)
    pub fn product_id(&self) -> NonZeroU64 {
        match self {
            Self::CreateProduct { source_id, .. } => *source_id,
            Self::UpdateProduct { id, .. } => *id,
            Self::UpdateVariants { product_id, .. } => *product_id,
            Self::CreateVariant { product_id, .. } => *product_id,
        }
    }

    pub fn http_method(&self) -> Method {
        match self {
            Self::CreateProduct { .. } => Method::Post,
            Self::UpdateProduct { .. } => Method::Put,
            Self::UpdateVariants { .. } => Method::Put,
            Self::CreateVariant { .. } => Method::Post,
        }
    }

    /// Store-relative path
    pub fn path(&self) -> String {
        match self {
            Self::CreateProduct { .. } => "/products".to_string(),
            Self::UpdateProduct { id, .. } => format!("/products/{}", id),
            Self::UpdateVariants { product_id, .. } => format!("/products/{}/variants", product_id),
            Self::CreateVariant { product_id, .. } => format!("/products/{}/variants", product_id),
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            Self::CreateProduct { data, .. }
            | Self::UpdateProduct { data, .. }
            | Self::UpdateVariants { data, .. }
            | Self::CreateVariant { data, .. } => data,
        }
    }

    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::CreateProduct { .. } => "create_product",
            Self::UpdateProduct { .. } => "update_product",
            Self::UpdateVariants { .. } => "update_variants",
            Self::CreateVariant { .. } => "create_variant",
        }
    }

    /// Execute this operation, recording the outcome whatever it is
    pub async fn execute(&self, client: &StoreClient) -> OperationResult {
        let url = client.context().url(&self.path());
        match client
            .send(self.http_method(), url, Some(self.body().clone()))
            .await
        {
            Ok(response) => OperationResult::from_response(self.clone(), response),
            Err(e) => {
                log::warn!("{} for product {} failed: {}", self.operation_type(), self.product_id(), e);
                OperationResult::error(self.clone(), e.to_string(), None)
            }
        }
    }
}

impl OperationResult {
    /// Record a response as-is, success or not
    pub fn from_response(operation: Operation, response: ApiResponse) -> Self {
        let success = response.is_success();
        if !success {
            log::warn!(
                "{} for product {} returned {}",
                operation.operation_type(),
                operation.product_id(),
                response.status
            );
        }
        Self {
            error: (!success).then(|| response.body_text()),
            operation,
            success,
            status_code: Some(response.status),
            data: Some(response.body),
        }
    }

    /// Create a new error result
    pub fn error(operation: Operation, error: String, status_code: Option<u16>) -> Self {
        Self {
            operation,
            success: false,
            status_code,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }
}
