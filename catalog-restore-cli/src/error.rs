//! Error types for the snapshot and restore engine

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by capture, snapshot loading and restore planning.
///
/// Per-request failures during a restore run are NOT represented here: they
/// are recorded as data on the restore report so the run can continue.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The pagination descriptor (Link header) could not be parsed
    #[error("malformed pagination descriptor '{descriptor}': {reason}")]
    MalformedPagination { descriptor: String, reason: String },

    /// A catalog page came back with a non-success status
    #[error("upstream fetch of {url} failed with status {status}: {body}")]
    UpstreamFetch {
        url: String,
        status: u16,
        body: String,
    },

    /// A snapshot document or live page failed entity validation
    #[error("invalid document from {origin}: {detail}")]
    InvalidDocument { origin: String, detail: String },

    /// The request never produced a response
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Reading or writing a snapshot file failed
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RestoreError {
    pub fn malformed_pagination(descriptor: &str, reason: impl Into<String>) -> Self {
        RestoreError::MalformedPagination {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_document(origin: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        RestoreError::InvalidDocument {
            origin: origin.into(),
            detail: detail.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RestoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RestoreError>;
