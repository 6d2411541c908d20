//! Request throttling for bulk store operations
//!
//! The only throttle is clustering: work is split into bounded groups that
//! run one after another, with full concurrency inside a group.

pub mod cluster;
pub mod config;

pub use cluster::ClusterRunner;
pub use config::ClusterConfig;
