//! Report Data Structures

use chrono::{DateTime, Utc};
use scastat_core::{
    GroupSummary, MedianDelta, MedianSummary, MetricSummary, RunResult, Scenario, median_deltas,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current JSON schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Complete aggregation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Provenance and settings
    pub meta: ReportMeta,
    /// Metric columns, in table order
    pub metrics: Vec<String>,
    /// One row per group
    pub groups: Vec<ConfigRow>,
    /// Per-run values the groups were built from
    pub runs: Vec<RunResult>,
    /// Bootstrap median summaries, if requested
    #[serde(default)]
    pub medians: Vec<MedianSummary>,
    /// Secure-vs-NoSec change of the medians per node count
    #[serde(default)]
    pub median_deltas: Vec<MedianDelta>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// [`SCHEMA_VERSION`] at the time of writing
    pub schema_version: u32,
    /// scastat version that wrote the report
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Input files and run counts
    pub inputs: ReportInputs,
    /// Settings the numbers depend on
    pub config: ReportConfig,
}

impl ReportMeta {
    /// Metadata stamped with the current time
    pub fn new(inputs: ReportInputs, config: ReportConfig) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            inputs,
            config,
        }
    }
}

/// Where the data came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInputs {
    /// Directory scanned for result files
    pub results_dir: String,
    /// Number of result files read
    pub files: usize,
    /// Number of runs aggregated
    pub runs: usize,
}

/// Aggregation settings captured in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Row grouping (`config` or `mode`)
    pub group_by: String,
    /// Decimal places for text output
    pub precision: u32,
    /// Bootstrap resamples per median
    pub bootstrap_iterations: usize,
    /// Bootstrap RNG seed
    pub bootstrap_seed: u64,
    /// Missing `GW_Received` handling
    pub received_policy: String,
    /// Simulated seconds per run, if throughput was derived
    pub sim_time_s: Option<f64>,
    /// Gateway starting battery, if energy metrics were derived
    pub gateway_initial_mj: Option<f64>,
}

/// One group row: scenario fields plus the group's metric summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRow {
    /// Group key
    pub config: String,
    /// Security mode decoded from the key
    pub mode: String,
    /// Node count, when the key carries one
    pub nodes: Option<u32>,
    /// Column label used by pivot tables (mode plus notable variant)
    pub series: String,
    /// Metric summaries of the group
    pub summary: GroupSummary,
}

impl ConfigRow {
    /// Row for a group, with scenario fields decoded from its key
    pub fn new(summary: GroupSummary) -> Self {
        let scenario = Scenario::parse(&summary.key);
        Self {
            config: summary.key.clone(),
            series: scenario.series_label(),
            mode: scenario.mode,
            nodes: scenario.nodes,
            summary,
        }
    }

    /// Summary of a metric in this row
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.summary.metric(name)
    }
}

impl Report {
    /// Assemble a report from aggregation output
    pub fn new(
        meta: ReportMeta,
        metrics: Vec<String>,
        groups: BTreeMap<String, GroupSummary>,
        runs: Vec<RunResult>,
    ) -> Self {
        let mut groups: Vec<ConfigRow> = groups.into_values().map(ConfigRow::new).collect();
        groups.sort_by(|a, b| {
            (&a.mode, a.nodes, &a.config).cmp(&(&b.mode, b.nodes, &b.config))
        });

        Self {
            meta,
            metrics,
            groups,
            runs,
            medians: Vec::new(),
            median_deltas: Vec::new(),
        }
    }

    /// Attach bootstrap median summaries and their Secure-vs-NoSec deltas
    pub fn with_medians(mut self, medians: Vec<MedianSummary>) -> Self {
        self.median_deltas = median_deltas(&medians);
        self.medians = medians;
        self
    }

    /// Delta for a median row, if it belongs to the `Secure` series
    pub fn delta_for(&self, median: &MedianSummary) -> Option<&MedianDelta> {
        let scenario = Scenario::parse(&median.key);
        if scenario.series_label() != "Secure" {
            return None;
        }
        let nodes = scenario.nodes?;
        self.median_deltas
            .iter()
            .find(|d| d.nodes == nodes && d.metric == median.metric)
    }

    /// Total runs across all groups
    pub fn run_count(&self) -> usize {
        self.groups.iter().map(|g| g.summary.run_count).sum()
    }
}
