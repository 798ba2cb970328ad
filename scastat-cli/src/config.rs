//! Configuration loading from scastat.toml
//!
//! The file is discovered by walking up from the current directory, or given
//! explicitly with `--config`. Every field has a default, so an empty file is
//! a valid configuration.

use scastat_core::{DerivedParams, MetricSpec, ReceivedPolicy, default_metric_specs};
use scastat_report::{TableSpec, default_table_specs};
use scastat_stats::{
    BootstrapConfig, DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_BOOTSTRAP_SEED,
    DEFAULT_CONFIDENCE_LEVEL, SUMMARY_PRECISION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked for during discovery
pub const CONFIG_FILE_NAME: &str = "scastat.toml";

/// scastat configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScastatConfig {
    /// Where result files are read from
    #[serde(default)]
    pub input: InputConfig,
    /// Metrics to extract; the built-in list when empty
    #[serde(default, rename = "metric")]
    pub metrics: Vec<MetricSpec>,
    /// Derived-metric parameters
    #[serde(default)]
    pub derived: DerivedConfig,
    /// Median bootstrap settings
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
    /// Pivot tables; the built-in set when empty
    #[serde(default, rename = "table")]
    pub tables: Vec<TableSpec>,
}

/// Input discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the simulator's result files
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// File extension of scalar files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Descend into subdirectories
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Regex a run's config must match to be included
    #[serde(default)]
    pub config_filter: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            extension: default_extension(),
            recursive: default_recursive(),
            config_filter: None,
        }
    }
}

fn default_results_dir() -> String {
    "results".to_string()
}
fn default_extension() -> String {
    "sca".to_string()
}
fn default_recursive() -> bool {
    true
}

/// Derived metrics and received-total handling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedConfig {
    /// `reported` or `reconstruct`
    #[serde(default)]
    pub received_policy: ReceivedPolicy,
    /// Simulated time per run, in seconds
    #[serde(default)]
    pub sim_time_s: Option<f64>,
    /// Gateway battery capacity at start, in mJ
    #[serde(default)]
    pub gateway_initial_mj: Option<f64>,
}

impl DerivedConfig {
    /// Parameters for [`scastat_core::apply_derived`]
    pub fn params(&self) -> DerivedParams {
        DerivedParams {
            sim_time_s: self.sim_time_s,
            gateway_initial_mj: self.gateway_initial_mj,
        }
    }
}

/// Bootstrap settings for median summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSettings {
    /// Number of resamples
    #[serde(default = "default_bootstrap_iterations")]
    pub iterations: usize,
    /// RNG seed
    #[serde(default = "default_bootstrap_seed")]
    pub seed: u64,
    /// Confidence level (0.0 to 1.0)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            iterations: default_bootstrap_iterations(),
            seed: default_bootstrap_seed(),
            confidence_level: default_confidence_level(),
        }
    }
}

impl BootstrapSettings {
    /// As a stats-crate config
    pub fn to_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            iterations: self.iterations,
            confidence_level: self.confidence_level,
            seed: self.seed,
        }
    }
}

fn default_bootstrap_iterations() -> usize {
    DEFAULT_BOOTSTRAP_ITERATIONS
}
fn default_bootstrap_seed() -> u64 {
    DEFAULT_BOOTSTRAP_SEED
}
fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the `report` command writes into
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Decimal places in human-readable output
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Default format of the `summary` command
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            precision: default_precision(),
            format: default_format(),
        }
    }
}

fn default_output_dir() -> String {
    "results".to_string()
}
fn default_precision() -> u32 {
    SUMMARY_PRECISION
}
fn default_format() -> String {
    "human".to_string()
}

impl ScastatConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path of the nearest `scastat.toml` at or above `start`
    pub fn find_from(start: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = start.as_ref().to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Discover and load configuration by walking up from the current
    /// directory. A file that exists but fails to parse is an error.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        match Self::find_from(cwd) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Configured metrics, or the built-in gateway set
    pub fn metric_specs(&self) -> Vec<MetricSpec> {
        if self.metrics.is_empty() {
            default_metric_specs()
        } else {
            self.metrics.clone()
        }
    }

    /// Configured tables, or the built-in delay/drops/energy set
    pub fn table_specs(&self) -> Vec<TableSpec> {
        if self.tables.is_empty() {
            default_table_specs()
        } else {
            self.tables.clone()
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# scastat configuration

[input]
# Directory holding the simulator's scalar result files
results_dir = "results"
# Scalar file extension
extension = "sca"
# Descend into subdirectories
recursive = true
# Only aggregate configs matching this regex (uncomment to enable)
# config_filter = "^(Secure|NoSec|Attack)\\d+"

[derived]
# "reported" keeps GW_Received as recorded; "reconstruct" fills a missing
# total from forwarded + drop counters
received_policy = "reported"
# Simulated seconds per run, enables Cloud_Throughput_msgps (uncomment to enable)
# sim_time_s = 300.0
# Gateway battery at start in mJ, enables the energy metrics (uncomment to enable)
# gateway_initial_mj = 5000.0

[bootstrap]
# Resamples for median confidence intervals
iterations = 6000
seed = 12345
confidence_level = 0.95

[output]
# Directory the report command writes into
directory = "results"
# Decimal places in terminal output
precision = 6
# Default summary format: human, json, csv, markdown, latex
format = "human"

# Metrics to extract. Omit every [[metric]] block to use the built-in list.
# aggregation: first, sum, avg, max
# [[metric]]
# name = "Sensor_AvgBattery_mJ"
# aggregation = "avg"
# aliases = ["Sensor_BatteryRemaining_mJ"]
# module = "sensor"

# Pivot tables. Omit every [[table]] block to use the built-in set.
# [[table]]
# id = "delay"
# title = "Mean End-to-End Delay vs Nodes"
# unit = "ms"
# metric = "Cloud_AvgEndToEndDelay_s"
# scale = 1000.0
"#
        .to_string()
    }
}
