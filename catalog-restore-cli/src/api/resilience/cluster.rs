//! Clustered task runner
//!
//! Splits pending operations into `ceil(N / C)` groups whose sizes differ by
//! at most one, then drives the groups strictly in sequence. Every operation
//! in a group is polled concurrently on the current task and the group is
//! joined before the next one starts, so at most `C` requests are ever in
//! flight. Results are written back by the operation's original index.

use std::future::Future;

use futures::future::join_all;
use log::{debug, info};

use super::config::ClusterConfig;

/// Partition `items` into evenly sized clusters of at most `limit` items.
///
/// Earlier clusters take the remainder, so sizes are non-increasing and
/// differ by at most one. Empty input yields no clusters.
pub fn clusterize<T>(items: Vec<T>, limit: usize) -> Vec<Vec<T>> {
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let limit = limit.clamp(1, total);
    let count = total.div_ceil(limit);
    let base = total / count;
    let extra = total % count;

    let mut clusters = Vec::with_capacity(count);
    let mut iter = items.into_iter();
    for idx in 0..count {
        let size = if idx < extra { base + 1 } else { base };
        clusters.push(iter.by_ref().take(size).collect());
    }
    clusters
}

/// Executes batches of independent async operations cluster by cluster
#[derive(Debug, Clone)]
pub struct ClusterRunner {
    config: ClusterConfig,
}

impl ClusterRunner {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Run every operation; the first failure aborts the run.
    ///
    /// A failing operation does not cancel its siblings: the failing cluster
    /// is joined in full first, and no later cluster is started.
    pub async fn run<I, T, E, F, Fut>(&self, label: &str, items: Vec<I>, op: F) -> Result<Vec<T>, E>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let total = items.len();
        let clusters = self.plan(label, items);
        let cluster_count = clusters.len();
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();

        for (cluster_idx, cluster) in clusters.into_iter().enumerate() {
            let futures = cluster
                .into_iter()
                .map(|(idx, item)| {
                    let fut = op(item);
                    async move { (idx, fut.await) }
                });
            let results = join_all(futures).await;

            for (idx, result) in results {
                slots[idx] = Some(result?);
            }
            debug!("{}: cluster {}/{} done", label, cluster_idx + 1, cluster_count);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Run every operation and keep each outcome, successes and failures alike
    pub async fn run_all<I, T, F, Fut>(&self, label: &str, items: Vec<I>, op: F) -> Vec<T>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total = items.len();
        let clusters = self.plan(label, items);
        let cluster_count = clusters.len();
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();

        for (cluster_idx, cluster) in clusters.into_iter().enumerate() {
            let futures = cluster
                .into_iter()
                .map(|(idx, item)| {
                    let fut = op(item);
                    async move { (idx, fut.await) }
                });

            for (idx, output) in join_all(futures).await {
                slots[idx] = Some(output);
            }
            debug!("{}: cluster {}/{} done", label, cluster_idx + 1, cluster_count);
        }

        slots.into_iter().flatten().collect()
    }

    fn plan<I>(&self, label: &str, items: Vec<I>) -> Vec<Vec<(usize, I)>> {
        let total = items.len();
        let clusters = clusterize(
            items.into_iter().enumerate().collect(),
            self.config.max_cluster_size,
        );
        info!(
            "{}: {} tasks have been divided into {} clusters",
            label,
            total,
            clusters.len()
        );
        clusters
    }
}

impl Default for ClusterRunner {
    fn default() -> Self {
        Self::new(ClusterConfig::default())
    }
}
