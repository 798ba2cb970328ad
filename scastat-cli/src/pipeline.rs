//! Analysis Pipeline
//!
//! Discovery -> parallel parsing -> per-run extraction -> derived metrics ->
//! aggregation -> [`Report`].

use crate::discovery::{discover_result_files, run_id_for};
use anyhow::Context;
use rayon::prelude::*;
use regex::Regex;
use scastat_core::{
    AliasTable, DerivedParams, MetricExtractor, MetricSpec, ReceivedPolicy, RunResult,
    apply_derived, apply_received_policy, derived_metric_names, read_scalar_file, summarize,
    summarize_medians,
};
use scastat_report::{Report, ReportConfig, ReportInputs, ReportMeta};
use scastat_stats::BootstrapConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How runs are grouped into summary rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// One row per config name
    #[default]
    Config,
    /// One row per security mode, pooling node counts and variants
    Mode,
}

impl GroupBy {
    /// Group key for a run
    pub fn key(self, run: &RunResult) -> String {
        match self {
            GroupBy::Config => run.config.clone(),
            GroupBy::Mode => run.scenario().mode,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            GroupBy::Config => "config",
            GroupBy::Mode => "mode",
        }
    }
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "config" => Ok(GroupBy::Config),
            "mode" => Ok(GroupBy::Mode),
            other => Err(format!("Unknown grouping: {}", other)),
        }
    }
}

/// Everything one analysis needs, resolved from config file and flags
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Directory scanned for result files
    pub results_dir: PathBuf,
    /// Scalar file extension
    pub extension: String,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Only keep runs whose config matches
    pub config_filter: Option<Regex>,
    /// Metrics extracted from every run
    pub metrics: Vec<MetricSpec>,
    /// How a missing `GW_Received` is handled
    pub received_policy: ReceivedPolicy,
    /// Derived-metric parameters
    pub derived: DerivedParams,
    /// Row grouping
    pub group_by: GroupBy,
    /// Median bootstrap settings
    pub bootstrap: BootstrapConfig,
    /// Metric to summarise by median, if any
    pub median_metric: Option<String>,
    /// Decimal places for human output
    pub precision: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            extension: "sca".to_string(),
            recursive: true,
            config_filter: None,
            metrics: scastat_core::default_metric_specs(),
            received_policy: ReceivedPolicy::default(),
            derived: DerivedParams::default(),
            group_by: GroupBy::default(),
            bootstrap: BootstrapConfig::default(),
            median_metric: None,
            precision: scastat_stats::SUMMARY_PRECISION,
        }
    }
}

/// Parse every file in parallel and extract one run per file, in input order.
pub fn load_runs(
    files: &[PathBuf],
    metrics: &[MetricSpec],
    extractor: &MetricExtractor,
) -> anyhow::Result<Vec<RunResult>> {
    files
        .par_iter()
        .map(|path| {
            let doc = read_scalar_file(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let run = RunResult::from_document(&run_id_for(path), &doc, metrics, extractor);
            debug!(
                run = %run.run_id,
                records = doc.records.len(),
                metrics = run.metrics.len(),
                "extracted run"
            );
            Ok(run)
        })
        .collect()
}

/// Metric columns: requested metrics, then any derived metric some run has.
pub fn report_metrics(metrics: &[MetricSpec], runs: &[RunResult]) -> Vec<String> {
    let mut columns: Vec<String> = metrics.iter().map(|m| m.name.clone()).collect();
    for name in derived_metric_names() {
        let present = runs.iter().any(|r| r.metric(name).is_some());
        if present && !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

/// Map a metric name or one of its aliases onto a report column.
pub fn resolve_metric_name<'a>(
    name: &str,
    columns: &'a [String],
    aliases: &AliasTable,
) -> Option<&'a str> {
    columns
        .iter()
        .find(|c| c.as_str() == name)
        .or_else(|| columns.iter().find(|c| aliases.matches(c.as_str(), name)))
        .map(String::as_str)
}

/// Run the whole analysis over `settings.results_dir`.
pub fn analyze(settings: &AnalysisSettings) -> anyhow::Result<Report> {
    let files = discover_result_files(
        &settings.results_dir,
        &settings.extension,
        settings.recursive,
    )?;
    info!(count = files.len(), dir = %settings.results_dir.display(), "reading result files");

    let extractor = MetricExtractor::for_specs(AliasTable::builtin(), &settings.metrics);
    let runs = load_runs(&files, &settings.metrics, &extractor)?;
    analyze_runs(runs, files.len(), &settings.results_dir, settings)
}

/// Aggregate already-extracted runs into a report.
pub fn analyze_runs(
    mut runs: Vec<RunResult>,
    file_count: usize,
    results_dir: &Path,
    settings: &AnalysisSettings,
) -> anyhow::Result<Report> {
    if let Some(filter) = &settings.config_filter {
        let before = runs.len();
        runs.retain(|r| filter.is_match(&r.config));
        if runs.len() < before {
            debug!(kept = runs.len(), dropped = before - runs.len(), "applied config filter");
        }
        if runs.is_empty() {
            warn!(filter = %filter, "config filter matched no runs");
        }
    }

    let mut reconstructed = 0;
    for run in &mut runs {
        if apply_received_policy(run, settings.received_policy) {
            reconstructed += 1;
        }
        apply_derived(run, &settings.derived);
    }
    if reconstructed > 0 {
        info!(runs = reconstructed, "reconstructed GW_Received totals");
    }

    let metrics = report_metrics(&settings.metrics, &runs);
    let group_by = settings.group_by;
    let groups = summarize(&runs, |r| group_by.key(r), &metrics)
        .context("Failed to aggregate runs")?;

    let medians = match &settings.median_metric {
        Some(requested) => {
            let extractor = MetricExtractor::for_specs(AliasTable::builtin(), &settings.metrics);
            let metric = resolve_metric_name(requested, &metrics, extractor.aliases())
                .with_context(|| {
                    format!(
                        "Unknown median metric {}; expected one of: {}",
                        requested,
                        metrics.join(", ")
                    )
                })?;
            if metric != requested.as_str() {
                debug!(alias = %requested, metric = %metric, "resolved median metric alias");
            }
            if !runs.iter().any(|r| r.metric(metric).is_some()) {
                warn!(metric = %metric, "no run reported the median metric");
            }
            summarize_medians(&runs, |r| group_by.key(r), metric, &settings.bootstrap)
                .with_context(|| format!("Failed to compute medians of {}", metric))?
        }
        None => Vec::new(),
    };

    let meta = ReportMeta::new(
        ReportInputs {
            results_dir: results_dir.display().to_string(),
            files: file_count,
            runs: runs.len(),
        },
        ReportConfig {
            group_by: group_by.as_str().to_string(),
            precision: settings.precision,
            bootstrap_iterations: settings.bootstrap.iterations,
            bootstrap_seed: settings.bootstrap.seed,
            received_policy: match settings.received_policy {
                ReceivedPolicy::Reported => "reported".to_string(),
                ReceivedPolicy::Reconstruct => "reconstruct".to_string(),
            },
            sim_time_s: settings.derived.sim_time_s,
            gateway_initial_mj: settings.derived.gateway_initial_mj,
        },
    );

    Ok(Report::new(meta, metrics, groups, runs).with_medians(medians))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scastat_core::names::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn settings(dir: &Path) -> AnalysisSettings {
        AnalysisSettings {
            results_dir: dir.to_path_buf(),
            metrics: vec![MetricSpec::new(GW_DROPPED_HMAC), MetricSpec::new(GW_FORWARDED)],
            ..Default::default()
        }
    }

    #[test]
    fn test_two_repetitions_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Secure5-0.sca", "scalar net.gw GW_Dropped_HMAC 4.0\n");
        write(dir.path(), "Secure5-1.sca", "scalar net.gw GW_Dropped_HMAC 6.0\n");

        let report = analyze(&settings(dir.path())).unwrap();
        assert_eq!(report.groups.len(), 1);
        let row = &report.groups[0];
        assert_eq!(row.config, "Secure5");
        assert_eq!(row.summary.run_count, 2);

        let hmac = row.metric(GW_DROPPED_HMAC).unwrap();
        assert_eq!(hmac.mean, Some(5.0));
        assert_eq!(hmac.sample_count, 2);
        assert!((hmac.ci95.unwrap() - 1.96).abs() < 1e-6);

        let forwarded = row.metric(GW_FORWARDED).unwrap();
        assert_eq!(forwarded.mean, None);
        assert_eq!(report.meta.inputs.files, 2);
    }

    #[test]
    fn test_attributes_override_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "General-0-20240101.sca",
            "run General-0\nattr configname Attack20_record\nattr repetition 3\n\
             scalar net.gw GW_Dropped_HMAC 9\n",
        );
        let report = analyze(&settings(dir.path())).unwrap();
        assert_eq!(report.runs[0].config, "Attack20_record");
        assert_eq!(report.runs[0].repetition, 3);
        assert_eq!(report.groups[0].nodes, Some(20));
    }

    #[test]
    fn test_config_filter_and_group_by_mode() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Secure5-0.sca", "scalar gw GW_Dropped_HMAC 1\n");
        write(dir.path(), "Secure10-0.sca", "scalar gw GW_Dropped_HMAC 3\n");
        write(dir.path(), "NoSec5-0.sca", "scalar gw GW_Dropped_HMAC 100\n");

        let settings = AnalysisSettings {
            config_filter: Some(Regex::new("^Secure").unwrap()),
            group_by: GroupBy::Mode,
            ..settings(dir.path())
        };
        let report = analyze(&settings).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].config, "Secure");
        assert_eq!(report.groups[0].metric(GW_DROPPED_HMAC).unwrap().mean, Some(2.0));
        assert_eq!(report.meta.config.group_by, "mode");
    }

    #[test]
    fn test_derived_columns_and_medians() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Attack5-0.sca",
            "scalar gw GW_Forwarded 10\nscalar gw GW_Dropped_HMAC 4\nscalar atk Fake_AttacksSent 8\n",
        );
        write(
            dir.path(),
            "Attack5-1.sca",
            "scalar gw GW_Forwarded 12\nscalar gw GW_Dropped_HMAC 2\nscalar atk Fake_AttacksSent 8\n",
        );

        let settings = AnalysisSettings {
            metrics: vec![
                MetricSpec::new(GW_FORWARDED),
                MetricSpec::new(GW_DROPPED_HMAC),
                MetricSpec::new(FAKE_ATTACKS_SENT),
            ],
            received_policy: ReceivedPolicy::Reconstruct,
            median_metric: Some(GW_FORWARDED.to_string()),
            bootstrap: BootstrapConfig {
                iterations: 200,
                ..Default::default()
            },
            ..settings(dir.path())
        };
        let report = analyze(&settings).unwrap();

        assert!(report.metrics.iter().any(|m| m == ATTACK_DETECTION_RATE));
        assert!(!report.metrics.iter().any(|m| m == CLOUD_THROUGHPUT_MSGPS));
        let rate = report.groups[0].metric(ATTACK_DETECTION_RATE).unwrap();
        assert_eq!(rate.mean, Some(0.375));

        // reconstructed total lives on the runs
        assert_eq!(report.runs[0].metric(GW_RECEIVED), Some(14.0));

        assert_eq!(report.medians.len(), 1);
        assert_eq!(report.medians[0].median, 11.0);
        assert_eq!(report.medians[0].runs, 2);
    }

    #[test]
    fn test_median_metric_alias_resolves() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "NoSec5-0.sca", "scalar cloud Cloud_AvgDelay_s 0.010
");
        write(dir.path(), "Secure5-0.sca", "scalar cloud Cloud_AvgEndToEndDelay_s 0.012
");

        let settings = AnalysisSettings {
            metrics: vec![MetricSpec::new(CLOUD_AVG_DELAY_S)],
            median_metric: Some("Cloud_AvgDelay_s".to_string()),
            bootstrap: BootstrapConfig {
                iterations: 100,
                ..Default::default()
            },
            ..settings(dir.path())
        };
        let report = analyze(&settings).unwrap();

        assert_eq!(report.medians.len(), 2);
        assert!(report.medians.iter().all(|m| m.metric == CLOUD_AVG_DELAY_S));
        assert_eq!(report.medians[0].median, 0.010);
        assert_eq!(report.medians[1].median, 0.012);
        assert!((report.median_deltas[0].delta_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_median_metric_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Secure5-0.sca", "scalar gw GW_Dropped_HMAC 4.0
");

        let settings = AnalysisSettings {
            median_metric: Some("GW_Droped_HMAC".to_string()),
            ..settings(dir.path())
        };
        let err = analyze(&settings).unwrap_err();
        assert!(err.to_string().contains("Unknown median metric GW_Droped_HMAC"));
        assert!(err.to_string().contains(GW_DROPPED_HMAC));
    }

    #[test]
    fn test_resolve_metric_name() {
        let columns = vec![CLOUD_AVG_DELAY_S.to_string(), GW_DROPPED.to_string()];
        let aliases = AliasTable::builtin();
        assert_eq!(
            resolve_metric_name(GW_DROPPED, &columns, &aliases),
            Some(GW_DROPPED)
        );
        assert_eq!(
            resolve_metric_name("Cloud_AvgDelay_s", &columns, &aliases),
            Some(CLOUD_AVG_DELAY_S)
        );
        assert_eq!(resolve_metric_name("Nope", &columns, &aliases), None);
    }

    #[test]
    fn test_no_files_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyze(&settings(dir.path())).unwrap_err();
        assert!(err.to_string().contains("no .sca files"));
    }

    #[test]
    fn test_group_by_parse() {
        assert_eq!("Config".parse::<GroupBy>(), Ok(GroupBy::Config));
        assert_eq!("mode".parse::<GroupBy>(), Ok(GroupBy::Mode));
        assert!("nodes".parse::<GroupBy>().is_err());
    }
}
