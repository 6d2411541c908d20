//! Restore Executor
//!
//! Turns plan rows into write operations and drives them in two clustered
//! passes: every product write first, then every variant write. Failures are
//! captured per request so the rest of the run continues; each result is
//! written back to its row by index.

use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use uuid::Uuid;

use super::plan::{ActionPlan, PlanRow, RecordAction};
use crate::api::client::StoreClient;
use crate::api::operations::{Operation, OperationResult};
use crate::api::resilience::ClusterRunner;

/// Outcome of every request issued for one plan row
#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    pub product_id: NonZeroU64,
    pub label: String,
    pub action: RecordAction,
    /// Variants recreated for this product, inline for CREATE or by POST for UPDATE
    pub recreated_variant_ids: Vec<NonZeroU64>,
    pub product_result: OperationResult,
    /// Bulk update first when present, then one entry per recreated variant
    pub variant_results: Vec<OperationResult>,
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        self.product_result.is_success() && self.variant_results.iter().all(OperationResult::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        std::iter::once(&self.product_result)
            .chain(&self.variant_results)
            .filter(|r| r.is_error())
    }
}

/// Report of one restore run
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub run_id: Uuid,
    pub store_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: Vec<RowOutcome>,
    /// Products that already matched, by id
    pub ignored: Vec<NonZeroU64>,
}

impl RestoreReport {
    pub fn succeeded_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_rows(&self) -> usize {
        self.rows.len() - self.succeeded_rows()
    }

    pub fn request_count(&self) -> usize {
        self.rows.iter().map(|r| 1 + r.variant_results.len()).sum()
    }

    pub fn failed_requests(&self) -> usize {
        self.rows.iter().map(|r| r.failures().count()).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_rows() > 0
    }
}

/// Product write for a row plus its variant writes
pub fn row_operations(row: &PlanRow) -> Option<(Operation, Vec<Operation>)> {
    let payloads = row.payloads.as_ref()?;
    let product = match row.action {
        RecordAction::Create => Operation::create_product(row.product_id, payloads.product.clone()),
        RecordAction::Update => Operation::update_product(row.product_id, payloads.product.clone()),
        RecordAction::Ignore => return None,
    };

    let mut variants = Vec::with_capacity(payloads.variant_creates.len() + 1);
    if let Some(update) = &payloads.variant_update {
        variants.push(Operation::update_variants(row.product_id, update.clone()));
    }
    variants.extend(payloads.variant_creates.iter().map(|create| {
        Operation::create_variant(row.product_id, create.variant_id, create.payload.clone())
    }));

    Some((product, variants))
}

pub struct RestoreExecutor<'a> {
    client: &'a StoreClient,
    runner: ClusterRunner,
}

impl<'a> RestoreExecutor<'a> {
    pub fn new(client: &'a StoreClient) -> Self {
        Self {
            runner: ClusterRunner::new(client.context().cluster),
            client,
        }
    }

    /// Execute every CREATE and UPDATE row of the plan
    pub async fn execute(&self, plan: &ActionPlan) -> RestoreReport {
        let started_at = Utc::now();
        let client = self.client;

        let mut rows = Vec::with_capacity(plan.actions.len());
        let mut product_ops = Vec::with_capacity(plan.actions.len());
        let mut variant_owners = Vec::new();
        let mut variant_ops = Vec::new();

        for row in &plan.actions {
            let Some((product, variants)) = row_operations(row) else {
                continue;
            };
            let row_idx = rows.len();
            rows.push(row);
            product_ops.push(product);
            for op in variants {
                variant_owners.push(row_idx);
                variant_ops.push(op);
            }
        }

        let product_results = self
            .runner
            .run_all("products", product_ops, |op: Operation| async move { op.execute(client).await })
            .await;
        let variant_results = self
            .runner
            .run_all("variants", variant_ops, |op: Operation| async move { op.execute(client).await })
            .await;

        let mut outcomes: Vec<RowOutcome> = rows
            .into_iter()
            .zip(product_results)
            .map(|(row, product_result)| RowOutcome {
                product_id: row.product_id,
                label: row.label.clone(),
                action: row.action,
                recreated_variant_ids: row.missing_variant_ids.clone(),
                product_result,
                variant_results: Vec::new(),
            })
            .collect();
        for (row_idx, result) in variant_owners.into_iter().zip(variant_results) {
            outcomes[row_idx].variant_results.push(result);
        }

        let report = RestoreReport {
            run_id: Uuid::new_v4(),
            store_id: client.context().store_id.clone(),
            started_at,
            finished_at: Utc::now(),
            rows: outcomes,
            ignored: plan.ignored.iter().map(|r| r.product_id).collect(),
        };
        info!(
            "Restore run {} finished: {} rows ok, {} rows with failures",
            report.run_id,
            report.succeeded_rows(),
            report.failed_rows()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::StoreContext;
    use crate::api::models::fixtures::{nz, product};
    use crate::api::resilience::ClusterConfig;
    use crate::api::transport::Method;
    use crate::api::transport::mock::{MockTransport, json_response};
    use crate::restore::resolver::resolve;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> StoreClient {
        let context = StoreContext::new("1", "token").with_cluster(ClusterConfig::new(3));
        StoreClient::new(context, transport)
    }

    fn scenario_plan() -> ActionPlan {
        let snapshot = vec![product(100, &[1, 2]), product(200, &[10])];
        let mut live = product(100, &[1]);
        live.published = Some(false);
        resolve(&snapshot, &[live])
    }

    #[test]
    fn test_row_operations_for_update() {
        let plan = scenario_plan();
        let row = plan.find_row(nz(100)).unwrap();
        let (product, variants) = row_operations(row).unwrap();

        assert_eq!(product.http_method(), Method::Put);
        assert_eq!(product.path(), "/products/100");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].operation_type(), "update_variants");
        assert_eq!(variants[1].operation_type(), "create_variant");
        assert_eq!(variants[1].path(), "/products/100/variants");
    }

    #[test]
    fn test_row_operations_for_create() {
        let plan = scenario_plan();
        let (product, variants) = row_operations(plan.find_row(nz(200)).unwrap()).unwrap();
        assert_eq!(product.http_method(), Method::Post);
        assert_eq!(product.path(), "/products");
        assert!(variants.is_empty());
    }

    #[tokio::test]
    async fn test_product_pass_runs_before_variant_pass() {
        let transport = Arc::new(MockTransport::ok());
        let client = client(transport.clone());

        let report = RestoreExecutor::new(&client).execute(&scenario_plan()).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        let kinds: Vec<(Method, String)> = requests
            .iter()
            .map(|r| (r.method, r.url.trim_start_matches("https://api.tiendanube.com/v1/1").to_string()))
            .collect();
        assert_eq!(
            kinds[..2],
            [
                (Method::Put, "/products/100".to_string()),
                (Method::Post, "/products".to_string())
            ]
        );
        assert!(kinds[2..].iter().all(|(_, path)| path == "/products/100/variants"));

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.request_count(), 4);
        let recreated: Vec<_> = report.rows.iter().map(|r| r.recreated_variant_ids.clone()).collect();
        assert_eq!(recreated, vec![vec![nz(2)], vec![nz(10)]]);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_failures_are_recorded_per_row() {
        let transport = Arc::new(MockTransport::new(|req| {
            Ok(if req.method == Method::Post && req.url.ends_with("/variants") {
                json_response(422, json!({"sku": ["has already been taken"]}))
            } else {
                json_response(200, json!({}))
            })
        }));
        let client = client(transport.clone());

        let report = RestoreExecutor::new(&client).execute(&scenario_plan()).await;

        // Every write was still attempted
        assert_eq!(transport.requests().len(), 4);

        let row_100 = report.rows.iter().find(|r| r.product_id == nz(100)).unwrap();
        assert!(!row_100.is_success());
        assert!(row_100.product_result.is_success());
        let failures: Vec<_> = row_100.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].status_code, Some(422));

        let row_200 = report.rows.iter().find(|r| r.product_id == nz(200)).unwrap();
        assert!(row_200.is_success());
        assert_eq!((report.succeeded_rows(), report.failed_rows()), (1, 1));
        assert_eq!(report.failed_requests(), 1);
    }

    #[tokio::test]
    async fn test_results_follow_their_rows() {
        // Every product fails except 3; results must land on the matching row
        let transport = Arc::new(MockTransport::new(|req| {
            let status = if req.url.ends_with("/products/3") { 200 } else { 500 };
            Ok(json_response(status, json!({"url": req.url})))
        }));
        let client = client(transport);

        let snapshot: Vec<_> = (1..=7).map(|id| product(id, &[id * 10])).collect();
        let live: Vec<_> = snapshot
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.published = Some(false);
                p
            })
            .collect();
        let plan = resolve(&snapshot, &live);

        let report = RestoreExecutor::new(&client).execute(&plan).await;
        for row in &report.rows {
            let echoed = row.product_result.data.as_ref().unwrap()["url"].as_str().unwrap().to_string();
            assert!(echoed.ends_with(&format!("/products/{}", row.product_id)));
            assert_eq!(row.product_result.is_success(), row.product_id == nz(3));
            assert_eq!(row.variant_results.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_ignored_rows_are_reported_not_sent() {
        let transport = Arc::new(MockTransport::ok());
        let client = client(transport.clone());

        let snapshot = vec![product(1, &[1]), product(2, &[2])];
        let plan = resolve(&snapshot, &[product(1, &[1])]);
        let report = RestoreExecutor::new(&client).execute(&plan).await;

        assert_eq!(report.ignored, vec![nz(1)]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }
}
