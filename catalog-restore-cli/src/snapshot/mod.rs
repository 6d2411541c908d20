//! Catalog snapshots
//!
//! A snapshot file is a single JSON array of FULL-projected products. Files
//! are written to a temporary sibling first and renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use log::info;
use serde_json::Value;
use uuid::Uuid;

use crate::api::client::StoreClient;
use crate::api::models::Product;
use crate::api::projection::{Projection, project};
use crate::catalog::fetch_catalog;
use crate::error::{RestoreError, Result};

/// Desired catalog state captured at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub products: Vec<Product>,
}

impl Snapshot {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn variant_count(&self) -> usize {
        self.products.iter().map(|p| p.variants.len()).sum()
    }

    /// Document body as written to disk
    pub fn to_document(&self) -> Value {
        Value::Array(
            self.products
                .iter()
                .map(|p| project(p, Projection::Full))
                .collect(),
        )
    }
}

/// Fetch the live catalog, optionally persisting it to `persist`
pub async fn capture(client: &StoreClient, persist: Option<&Path>) -> Result<Snapshot> {
    let snapshot = Snapshot::new(fetch_catalog(client).await?);
    if let Some(path) = persist {
        save_snapshot(&snapshot, path)?;
    }
    Ok(snapshot)
}

/// Read and validate a snapshot document
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path).map_err(|e| RestoreError::io(path, e))?;
    let products: Vec<Product> = serde_json::from_slice(&bytes)
        .map_err(|e| RestoreError::invalid_document(path.display().to_string(), e))?;
    info!("Loaded {} products from {}", products.len(), path.display());
    Ok(Snapshot::new(products))
}

/// Atomically write `snapshot` to `path`
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RestoreError::io(parent, e))?;
    }

    let body = serde_json::to_vec_pretty(&snapshot.to_document())
        .map_err(|e| RestoreError::invalid_document(path.display().to_string(), e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&tmp, body).map_err(|e| RestoreError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(RestoreError::io(path, e));
    }

    info!("Saved {} products to {}", snapshot.len(), path.display());
    Ok(())
}

/// `"<store_id> - Snapshot <YYYY-MM-DD HH-MM>.json"`
pub fn default_snapshot_name<Tz: TimeZone>(store_id: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} - Snapshot {}.json", store_id, at.format("%Y-%m-%d %H-%M"))
}

/// Default snapshot path inside `dir`, timestamped now
pub fn default_snapshot_path(dir: &Path, store_id: &str) -> PathBuf {
    dir.join(default_snapshot_name(store_id, &chrono::Local::now()))
}
