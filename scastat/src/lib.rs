#![warn(missing_docs)]
//! # scastat
//!
//! Aggregates per-run scalar exports from a network simulator into research
//! tables:
//! - **Tolerant parsing**: `scalar <module> <name> <value>` lines, everything else skipped
//! - **Metric extraction**: first/sum/avg/max across modules, one alias table for renamed metrics
//! - **Run decoding**: config and repetition from the file name or `attr` headers
//! - **Aggregation**: per-config mean with a normal-approximation 95% CI
//! - **Bootstrap medians**: seeded, reproducible percentile intervals
//! - **Reports**: CSV, JSON, Markdown and LaTeX pivot tables
//!
//! ## Quick Start
//!
//! ```
//! use scastat::{MetricSpec, RunResult, by_config, parse_document, summarize};
//! use scastat::{AliasTable, MetricExtractor};
//!
//! let specs = vec![MetricSpec::new("GW_Dropped_HMAC")];
//! let extractor = MetricExtractor::for_specs(AliasTable::builtin(), &specs);
//!
//! let runs: Vec<RunResult> = [("Secure5-0", "4.0"), ("Secure5-1", "6.0")]
//!     .iter()
//!     .map(|(id, value)| {
//!         let doc = parse_document([format!("scalar net.gw GW_Dropped_HMAC {}", value)]);
//!         RunResult::from_document(id, &doc, &specs, &extractor)
//!     })
//!     .collect();
//!
//! let groups = summarize(&runs, by_config, &["GW_Dropped_HMAC"]).unwrap();
//! let hmac = groups["Secure5"].metric("GW_Dropped_HMAC").unwrap();
//! assert_eq!(hmac.mean, Some(5.0));
//! assert_eq!(hmac.sample_count, 2);
//! ```

// Re-export core types
pub use scastat_core::{
    AggregateError, Aggregation, AliasTable, DerivedParams, GroupSummary, MedianDelta,
    MedianSummary, MetricExtractor, MetricSpec, MetricSummary, ParseError, ReceivedPolicy, RunId,
    RunResult, ScalarDocument, ScalarRecord, Scenario, apply_derived, apply_received_policy,
    by_config, default_metric_specs, extract_metric, median_deltas, names, parse, parse_document,
    parse_scalar_line, parse_str, read_scalar_file, summarize, summarize_medians,
};

// Re-export stats
pub use scastat_stats::{
    BootstrapConfig, BootstrapError, BootstrapResult, ConfidenceInterval, MeanCi,
    compute_median, compute_median_bootstrap, compute_percentile, mean_ci95, median_ci95,
    relative_change_percent,
};

// Re-export reporting
pub use scastat_report::{
    OutputFormat, PivotTable, Report, ReportError, TableSpec, generate_csv_report,
    generate_json_report, generate_markdown_tables,
};

pub use scastat_cli::{Cli, ScastatConfig, run, run_with_cli};
