//! Snapshot reconciliation and bulk restore
//!
//! `plan` fetches the live catalog and resolves it against a snapshot;
//! `restore` additionally executes the resulting writes.

pub mod executor;
pub mod plan;
pub mod resolver;

pub use executor::{RestoreExecutor, RestoreReport};
pub use plan::{ActionPlan, PlanRow, RecordAction};
pub use resolver::resolve;

use log::info;

use crate::api::client::StoreClient;
use crate::catalog::fetch_catalog;
use crate::error::Result;
use crate::snapshot::Snapshot;

/// Terminal states of a restore run
#[derive(Debug)]
pub enum RestoreOutcome {
    /// Every snapshot product already matches (or the snapshot is empty)
    NothingToRestore { ignored: Vec<PlanRow> },
    Executed(RestoreReport),
}

/// Fetch the live catalog and resolve the snapshot against it
pub async fn plan(client: &StoreClient, snapshot: &Snapshot) -> Result<ActionPlan> {
    if snapshot.is_empty() {
        return Ok(ActionPlan::default());
    }
    let live = fetch_catalog(client).await?;
    let plan = resolve(&snapshot.products, &live);
    info!(
        "Plan: {} to create, {} to update, {} ignored",
        plan.create_count(),
        plan.update_count(),
        plan.ignore_count()
    );
    Ok(plan)
}

/// Bring the store back to the snapshot state
pub async fn restore(client: &StoreClient, snapshot: &Snapshot) -> Result<RestoreOutcome> {
    let plan = plan(client, snapshot).await?;
    if plan.is_empty() {
        info!("Nothing to restore");
        return Ok(RestoreOutcome::NothingToRestore {
            ignored: plan.ignored,
        });
    }
    let report = RestoreExecutor::new(client).execute(&plan).await;
    Ok(RestoreOutcome::Executed(report))
}
