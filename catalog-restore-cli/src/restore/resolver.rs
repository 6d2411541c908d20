//! Reconciliation Resolver
//!
//! Left-joins the snapshot against the live catalog on product id. The
//! snapshot decides which products are considered; live products it does
//! not mention are left alone.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;

use log::debug;
use serde_json::Value;

use super::plan::{ActionPlan, PlanRow, VariantCreate, WritePayloads};
use crate::api::models::Product;
use crate::api::projection::{Projection, project, strip_field};

/// Classify every snapshot product against the live catalog
pub fn resolve(snapshot: &[Product], live: &[Product]) -> ActionPlan {
    // Duplicate live ids: the last one wins
    let live_by_id: HashMap<NonZeroU64, &Product> = live.iter().map(|p| (p.id, p)).collect();

    let mut plan = ActionPlan::default();
    for desired in snapshot {
        let row = resolve_product(desired, live_by_id.get(&desired.id).copied());
        debug!("{} -> {}", row.label, row.action);
        plan.push(row);
    }
    plan
}

/// Decide the action for one product given its live counterpart, if any
pub fn resolve_product(desired: &Product, live: Option<&Product>) -> PlanRow {
    let Some(live) = live else {
        return PlanRow::create(desired, create_payloads(desired));
    };

    if products_are_equal(desired, live) {
        return PlanRow::ignore(desired, live);
    }

    let missing = missing_variant_ids(desired, live);
    let excluded: HashSet<NonZeroU64> = missing.iter().copied().collect();
    let known = desired.without_variants(&excluded);

    let variant_creates = desired
        .variants
        .iter()
        .filter(|v| excluded.contains(&v.id))
        .map(|v| VariantCreate {
            variant_id: v.id,
            payload: without_product_id(project(v, Projection::Create)),
        })
        .collect();

    let payloads = WritePayloads {
        product: update_product_payload(&known),
        variant_update: variant_update_payload(&known),
        variant_creates,
    };
    PlanRow::update(desired, live, payloads, missing)
}

/// Structural equality of the UPDATE projections
pub fn products_are_equal(desired: &Product, live: &Product) -> bool {
    project(desired, Projection::Update) == project(live, Projection::Update)
}

/// Desired variant ids absent from the live product, in snapshot order
pub fn missing_variant_ids(desired: &Product, live: &Product) -> Vec<NonZeroU64> {
    let live_ids: HashSet<NonZeroU64> = live.variant_ids().into_iter().collect();
    desired
        .variant_ids()
        .into_iter()
        .filter(|id| !live_ids.contains(id))
        .collect()
}

/// A recreated product carries its variants inline
fn create_payloads(desired: &Product) -> WritePayloads {
    WritePayloads {
        product: project(desired, Projection::Create),
        variant_update: None,
        variant_creates: Vec::new(),
    }
}

/// Variants travel in their own bulk call and the id goes in the path
fn update_product_payload(product: &Product) -> Value {
    let mut payload = project(product, Projection::Update);
    strip_field(&mut payload, "variants");
    strip_field(&mut payload, "id");
    payload
}

fn variant_update_payload(product: &Product) -> Option<Value> {
    if product.variants.is_empty() {
        return None;
    }
    let variants = product
        .variants
        .iter()
        .map(|v| without_product_id(project(v, Projection::Update)))
        .collect();
    Some(Value::Array(variants))
}

fn without_product_id(mut payload: Value) -> Value {
    strip_field(&mut payload, "product_id");
    payload
}
