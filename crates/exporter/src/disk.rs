//! Disk usage of the node's data directories.

use crate::scheduler::Collector;
use crate::sink::{Labels, MetricsSink, TargetMetrics};
use async_trait::async_trait;
use eyre::WrapErr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

pub struct DiskUsage {
    directories: Vec<PathBuf>,
    metrics: TargetMetrics,
    interval: Duration,
}

impl DiskUsage {
    pub fn new(
        directories: Vec<PathBuf>,
        sink: Arc<dyn MetricsSink>,
        namespace: &str,
        interval: Duration,
    ) -> Self {
        Self {
            directories,
            metrics: TargetMetrics::new(sink, namespace, Labels::new()),
            interval,
        }
    }

    pub async fn directory_size(path: PathBuf) -> eyre::Result<u64> {
        tokio::task::spawn_blocking(move || walk_size(&path)).await?
    }
}

/// Sum of the sizes of every file below `path`, without following symlinks.
///
/// Only a missing or unreadable `path` is an error. Entries that vanish or
/// cannot be read while walking are left out of the total.
fn walk_size(path: &Path) -> eyre::Result<u64> {
    std::fs::metadata(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    let total = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum();
    Ok(total)
}

#[async_trait]
impl Collector for DiskUsage {
    fn name(&self) -> &str {
        "disk-usage"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) {
        for directory in &self.directories {
            match Self::directory_size(directory.clone()).await {
                Ok(bytes) => {
                    let label = directory.display().to_string();
                    self.metrics
                        .set_labeled("usage_bytes", &[("directory", &label)], bytes as f64);
                }
                Err(err) => {
                    tracing::error!(
                        directory = %directory.display(),
                        "Failed to get disk usage: {:#}",
                        err
                    );
                }
            }
        }
    }
}
