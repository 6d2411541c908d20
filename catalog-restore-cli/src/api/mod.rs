//! Store REST API
//!
//! Entity models and their wire projections, the HTTP transport seam, the
//! per-store client, write operations and the clustered runner that drives
//! them.

pub mod client;
pub mod models;
pub mod operations;
pub mod pagination;
pub mod projection;
pub mod resilience;
pub mod transport;
