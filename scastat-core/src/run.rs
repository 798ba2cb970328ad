//! Per-run metric extraction

use crate::metric::{MetricExtractor, MetricSpec};
use crate::record::ScalarDocument;
use crate::run_id::{RunId, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Metrics of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Source identifier, normally the result file's stem
    pub run_id: String,
    /// Config the run belongs to
    pub config: String,
    /// Repetition index within the config
    pub repetition: u32,
    /// Requested metrics that had at least one matching record
    pub metrics: BTreeMap<String, f64>,
}

impl RunResult {
    /// Empty result with config and repetition decoded from `run_id`
    pub fn new(run_id: impl Into<String>) -> Self {
        let run_id = run_id.into();
        let RunId { config, repetition } = RunId::parse(&run_id);
        Self {
            run_id,
            config,
            repetition,
            metrics: BTreeMap::new(),
        }
    }

    /// Builder-style metric insertion
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Value of a metric, if the run reported it
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Scenario decoded from the config name
    pub fn scenario(&self) -> Scenario {
        Scenario::parse(&self.config)
    }

    /// Extract `specs` from a parsed scalar file.
    ///
    /// `attr configname` and `attr repetition` headers, when present, take
    /// precedence over what `source_id` encodes. Metrics with no matching
    /// record are left out rather than defaulted.
    pub fn from_document(
        source_id: &str,
        doc: &ScalarDocument,
        specs: &[MetricSpec],
        extractor: &MetricExtractor,
    ) -> Self {
        let mut run = Self::new(source_id);

        if let Some(config) = doc.attribute("configname").filter(|c| !c.is_empty()) {
            run.config = config.to_string();
        }
        if let Some(rep) = doc.attribute("repetition") {
            match rep.trim().parse() {
                Ok(rep) => run.repetition = rep,
                Err(_) => warn!(run = source_id, value = rep, "ignoring non-numeric repetition attribute"),
            }
        }

        for spec in specs {
            if let Some(value) = extractor.try_extract_spec(&doc.records, spec) {
                run.metrics.insert(spec.name.clone(), value);
            }
        }
        run
    }
}

/// Group key selecting the run's config
pub fn by_config(run: &RunResult) -> String {
    run.config.clone()
}
