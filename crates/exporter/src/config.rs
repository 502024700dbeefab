//! Exporter configuration, read from YAML.

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// The execution node to monitor.
    pub execution: NodeConfig,
    /// The consensus node to monitor.
    pub consensus: NodeConfig,
    /// How often the targets are polled, in seconds.
    pub polling_frequency_seconds: u64,
    pub disk_usage: DiskUsageConfig,
    /// Prefix of every metric name.
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub enabled: bool,
    pub name: String,
    pub url: String,
}

/// Exposes the size of each listed directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskUsageConfig {
    pub enabled: bool,
    pub directories: Vec<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: String::new(),
            url: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            execution: NodeConfig {
                enabled: true,
                name: "execution".to_string(),
                url: "http://localhost:8545".to_string(),
            },
            consensus: NodeConfig {
                enabled: true,
                name: "consensus".to_string(),
                url: "http://localhost:5052".to_string(),
            },
            polling_frequency_seconds: 5,
            disk_usage: DiskUsageConfig::default(),
            namespace: "eth".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> eyre::Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_frequency_seconds)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.polling_frequency_seconds == 0 {
            eyre::bail!("pollingFrequencySeconds must be greater than zero");
        }

        for (role, node) in [("execution", &self.execution), ("consensus", &self.consensus)] {
            if !node.enabled {
                continue;
            }
            if node.name.is_empty() {
                eyre::bail!("{} node name must not be empty", role);
            }
            url::Url::parse(&node.url)
                .wrap_err_with(|| format!("Invalid {} node url: {}", role, node.url))?;
        }

        if self.disk_usage.enabled && self.disk_usage.directories.is_empty() {
            eyre::bail!("diskUsage is enabled but no directories are configured");
        }

        Ok(())
    }
}
