//! Cluster configuration

/// Concurrency ceiling used by the clustered runner.
///
/// The platform rate limits per store, so the default stays well under the
/// burst a single store tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Maximum operations in flight within one cluster
    pub max_cluster_size: usize,
}

pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 40;

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
        }
    }
}

impl ClusterConfig {
    /// A ceiling of zero is treated as one (strictly sequential)
    pub fn new(max_cluster_size: usize) -> Self {
        Self {
            max_cluster_size: max_cluster_size.max(1),
        }
    }

    /// One request at a time
    #[cfg(test)]
    pub fn sequential() -> Self {
        Self::new(1)
    }
}
