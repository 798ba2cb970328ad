#![warn(missing_docs)]
//! scastat Core
//!
//! Turns simulator scalar exports into per-run metrics and per-config
//! summaries:
//! - [`parse`] / [`parse_document`]: tolerant `scalar <module> <name> <value>` parsing
//! - [`extract_metric`] / [`MetricExtractor`]: first/sum/avg/max extraction through an alias table
//! - [`RunResult`]: metrics of one run, config and repetition decoded from its id
//! - [`summarize`]: per-group mean and 95% CI, [`summarize_medians`] for bootstrap medians
//!
//! Nothing in this crate performs I/O except [`read_scalar_file`].

mod aggregate;
mod derived;
mod metric;
pub mod names;
mod parser;
mod record;
mod run;
mod run_id;

pub use aggregate::{
    AggregateError, GroupSummary, MedianDelta, MedianSummary, MetricSummary, median_deltas,
    summarize, summarize_medians,
};
pub use derived::{
    DerivedParams, ReceivedPolicy, apply_derived, apply_received_policy, derived_metric_names,
};
pub use metric::{
    Aggregation, AliasTable, MetricExtractor, MetricSpec, default_metric_specs, extract_metric,
};
pub use parser::{
    ParseError, parse, parse_document, parse_scalar_line, parse_str, read_scalar_file,
};
pub use record::{ScalarDocument, ScalarRecord};
pub use run::{RunResult, by_config};
pub use run_id::{RunId, Scenario};
