//! Action plan produced by reconciliation

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::models::Product;

/// Action to take for a snapshot product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordAction {
    /// Recreate the product (no live product shares its id)
    Create,
    /// Overwrite the live product (exists but differs)
    Update,
    /// Live product already matches
    Ignore,
}

impl std::fmt::Display for RecordAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordAction::Create => write!(f, "CREATE"),
            RecordAction::Update => write!(f, "UPDATE"),
            RecordAction::Ignore => write!(f, "IGNORE"),
        }
    }
}

/// A variant to recreate on a live product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantCreate {
    /// Id the variant had in the snapshot
    pub variant_id: NonZeroU64,
    /// CREATE-projected variant, `product_id` removed
    pub payload: Value,
}

/// Wire bodies derived for one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WritePayloads {
    /// Body of the product POST or PUT
    pub product: Value,
    /// Body of the bulk variant PUT, absent when no known variant remains
    pub variant_update: Option<Value>,
    /// One body per variant POST
    pub variant_creates: Vec<VariantCreate>,
}

impl WritePayloads {
    /// Number of HTTP writes these payloads turn into
    pub fn request_count(&self) -> usize {
        1 + usize::from(self.variant_update.is_some()) + self.variant_creates.len()
    }
}

/// One snapshot product and the decision taken for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub product_id: NonZeroU64,
    pub label: String,
    pub action: RecordAction,
    /// Snapshot state
    #[serde(skip)]
    pub desired: Product,
    /// Live state, None for CREATE
    #[serde(skip)]
    pub live: Option<Product>,
    /// None for IGNORE
    pub payloads: Option<WritePayloads>,
    /// Snapshot variants the live store no longer has (all of them for CREATE)
    pub missing_variant_ids: Vec<NonZeroU64>,
}

impl PlanRow {
    /// Every desired variant is missing; they travel inside the product POST
    pub fn create(desired: &Product, payloads: WritePayloads) -> Self {
        Self::new(
            desired,
            None,
            RecordAction::Create,
            Some(payloads),
            desired.variant_ids(),
        )
    }

    pub fn update(
        desired: &Product,
        live: &Product,
        payloads: WritePayloads,
        missing_variant_ids: Vec<NonZeroU64>,
    ) -> Self {
        Self::new(
            desired,
            Some(live),
            RecordAction::Update,
            Some(payloads),
            missing_variant_ids,
        )
    }

    pub fn ignore(desired: &Product, live: &Product) -> Self {
        Self::new(desired, Some(live), RecordAction::Ignore, None, Vec::new())
    }

    fn new(
        desired: &Product,
        live: Option<&Product>,
        action: RecordAction,
        payloads: Option<WritePayloads>,
        missing_variant_ids: Vec<NonZeroU64>,
    ) -> Self {
        PlanRow {
            product_id: desired.id,
            label: desired.label(),
            action,
            desired: desired.clone(),
            live: live.cloned(),
            payloads,
            missing_variant_ids,
        }
    }
}

/// Rows to execute plus the rows that need nothing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionPlan {
    /// CREATE and UPDATE rows, in snapshot order
    pub actions: Vec<PlanRow>,
    /// IGNORE rows, kept for audit
    pub ignored: Vec<PlanRow>,
}

impl ActionPlan {
    /// Route a row to `actions` or `ignored`
    pub fn push(&mut self, row: PlanRow) {
        if row.action == RecordAction::Ignore {
            self.ignored.push(row);
        } else {
            self.actions.push(row);
        }
    }

    /// True when no writes are needed
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[cfg(test)]
    pub fn total_rows(&self) -> usize {
        self.actions.len() + self.ignored.len()
    }

    pub fn count_by_action(&self, action: RecordAction) -> usize {
        self.actions
            .iter()
            .chain(&self.ignored)
            .filter(|r| r.action == action)
            .count()
    }

    pub fn create_count(&self) -> usize {
        self.count_by_action(RecordAction::Create)
    }

    pub fn update_count(&self) -> usize {
        self.count_by_action(RecordAction::Update)
    }

    pub fn ignore_count(&self) -> usize {
        self.count_by_action(RecordAction::Ignore)
    }

    /// Total HTTP writes executing this plan would issue
    pub fn request_count(&self) -> usize {
        self.actions
            .iter()
            .filter_map(|r| r.payloads.as_ref())
            .map(WritePayloads::request_count)
            .sum()
    }

    #[cfg(test)]
    pub fn find_row(&self, product_id: NonZeroU64) -> Option<&PlanRow> {
        self.actions
            .iter()
            .chain(&self.ignored)
            .find(|r| r.product_id == product_id)
    }
}
