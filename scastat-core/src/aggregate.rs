//! Run Aggregation
//!
//! Groups runs by a caller-chosen key and summarises each requested metric
//! across the group's repetitions. A run missing a metric still counts toward
//! its group; it just contributes no value for that metric.

use crate::run::RunResult;
use crate::run_id::Scenario;
use scastat_stats::{
    BootstrapConfig, BootstrapError, SUMMARY_PRECISION, compute_median_bootstrap, mean_ci95,
    relative_change_percent,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Mean and CI of one metric within one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Group key (normally the config name)
    pub config: String,
    /// Metric name
    pub metric: String,
    /// Mean across runs, `None` when no run reported the metric
    pub mean: Option<f64>,
    /// Normal-approximation 95% CI half-width
    pub ci95: Option<f64>,
    /// Sample standard deviation (`ddof = 1`)
    pub std_dev: Option<f64>,
    /// Number of runs that reported the metric
    pub sample_count: usize,
}

/// All metric summaries of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group key
    pub key: String,
    /// Number of runs in the group, whether or not they reported every metric
    pub run_count: usize,
    /// One entry per requested metric, in request order
    pub metrics: Vec<MetricSummary>,
}

impl GroupSummary {
    /// Summary for a metric by name
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == name)
    }
}

/// Median of a metric across a group's runs with its bootstrap interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianSummary {
    /// Group key
    pub key: String,
    /// Metric name
    pub metric: String,
    /// Median of per-run values (NaN when none)
    #[serde(with = "nan_as_null")]
    pub median: f64,
    /// Lower bootstrap bound (NaN when undefined)
    #[serde(with = "nan_as_null")]
    pub ci_low: f64,
    /// Upper bootstrap bound (NaN when undefined)
    #[serde(with = "nan_as_null")]
    pub ci_high: f64,
    /// Number of runs that reported the metric
    pub runs: usize,
}

/// Secure-vs-NoSec change of a median at one node count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianDelta {
    /// Metric the medians were taken of
    pub metric: String,
    /// Node count shared by both groups
    pub nodes: u32,
    /// Median of the `Secure` series
    #[serde(with = "nan_as_null")]
    pub secure: f64,
    /// Median of the `NoSec` series
    #[serde(with = "nan_as_null")]
    pub nosec: f64,
    /// `100 * (secure - nosec) / nosec`, NaN when the baseline is zero or missing
    #[serde(with = "nan_as_null")]
    pub delta_percent: f64,
}

/// NaN sentinels travel as JSON `null`
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

/// Errors from aggregation
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The input slice was empty
    #[error("no runs to aggregate")]
    NoRuns,

    /// Two runs claim the same repetition of one config
    #[error("config {config} has repetition {repetition} twice ({first} and {second})")]
    DuplicateRepetition {
        /// Config name
        config: String,
        /// Repetition index seen twice
        repetition: u32,
        /// Run id seen first
        first: String,
        /// Run id seen second
        second: String,
    },

    /// Bootstrap settings were rejected
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Summarise `metrics` per group.
///
/// Mean and CI are rounded to [`SUMMARY_PRECISION`] places; use
/// [`scastat_stats::mean_ci95`] on the raw values for full precision.
pub fn summarize<F, S>(
    runs: &[RunResult],
    group_key: F,
    metrics: &[S],
) -> Result<BTreeMap<String, GroupSummary>, AggregateError>
where
    F: Fn(&RunResult) -> String,
    S: AsRef<str>,
{
    let groups = group_runs(runs, group_key)?;

    Ok(groups
        .into_iter()
        .map(|(key, members)| {
            let summaries = metrics
                .iter()
                .map(|metric| {
                    let metric = metric.as_ref();
                    let values: Vec<f64> = members.iter().filter_map(|r| r.metric(metric)).collect();
                    let stats = mean_ci95(&values).rounded(SUMMARY_PRECISION);
                    MetricSummary {
                        config: key.clone(),
                        metric: metric.to_string(),
                        mean: stats.mean,
                        ci95: stats.ci95,
                        std_dev: stats.std_dev,
                        sample_count: stats.sample_count,
                    }
                })
                .collect();

            let summary = GroupSummary {
                key: key.clone(),
                run_count: members.len(),
                metrics: summaries,
            };
            (key, summary)
        })
        .collect())
}

/// Median of `metric` per group, with a percentile-bootstrap interval.
pub fn summarize_medians<F>(
    runs: &[RunResult],
    group_key: F,
    metric: &str,
    config: &BootstrapConfig,
) -> Result<Vec<MedianSummary>, AggregateError>
where
    F: Fn(&RunResult) -> String,
{
    let groups = group_runs(runs, group_key)?;

    groups
        .into_iter()
        .map(|(key, members)| {
            let values: Vec<f64> = members.iter().filter_map(|r| r.metric(metric)).collect();
            let result = compute_median_bootstrap(&values, config)?;
            Ok(MedianSummary {
                key,
                metric: metric.to_string(),
                median: result.point_estimate,
                ci_low: result.confidence_interval.lower,
                ci_high: result.confidence_interval.upper,
                runs: values.len(),
            })
        })
        .collect()
}

/// Per node count, how far the `Secure` median sits from the `NoSec` one.
///
/// Group keys are decoded with [`Scenario::parse`]; keys without a node
/// count are ignored. Several configs with the same series and node count
/// (`Secure50_record`, `Secure50_CI`) are averaged first. Node counts
/// lacking either series produce no entry.
pub fn median_deltas(medians: &[MedianSummary]) -> Vec<MedianDelta> {
    let mut cells: BTreeMap<(&str, u32), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for median in medians {
        let scenario = Scenario::parse(&median.key);
        let Some(nodes) = scenario.nodes else { continue };
        let (secure, nosec) = cells.entry((median.metric.as_str(), nodes)).or_default();
        match scenario.series_label().as_str() {
            "Secure" => secure.push(median.median),
            "NoSec" => nosec.push(median.median),
            _ => {}
        }
    }

    cells
        .into_iter()
        .filter(|(_, (secure, nosec))| !secure.is_empty() && !nosec.is_empty())
        .map(|((metric, nodes), (secure, nosec))| {
            let secure = secure.iter().sum::<f64>() / secure.len() as f64;
            let nosec = nosec.iter().sum::<f64>() / nosec.len() as f64;
            MedianDelta {
                metric: metric.to_string(),
                nodes,
                secure,
                nosec,
                delta_percent: relative_change_percent(secure, nosec),
            }
        })
        .collect()
}

/// Partition runs by key after checking repetitions are unique per config.
fn group_runs<F>(
    runs: &[RunResult],
    group_key: F,
) -> Result<BTreeMap<String, Vec<&RunResult>>, AggregateError>
where
    F: Fn(&RunResult) -> String,
{
    if runs.is_empty() {
        return Err(AggregateError::NoRuns);
    }

    let mut seen: HashMap<(&str, u32), &str> = HashMap::new();
    for run in runs {
        if let Some(first) = seen.insert((run.config.as_str(), run.repetition), &run.run_id) {
            return Err(AggregateError::DuplicateRepetition {
                config: run.config.clone(),
                repetition: run.repetition,
                first: first.to_string(),
                second: run.run_id.clone(),
            });
        }
    }

    let mut groups: BTreeMap<String, Vec<&RunResult>> = BTreeMap::new();
    for run in runs {
        groups.entry(group_key(run)).or_default().push(run);
    }
    Ok(groups)
}
