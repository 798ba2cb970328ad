//! Metric Extraction
//!
//! Pulls a single number for a named metric out of a run's scalar records.
//! Several simulator versions emit the same quantity under different names,
//! so matching goes through one [`AliasTable`] instead of per-script
//! fallback lists.

use crate::record::ScalarRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How to combine several records that match one metric name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Value of the first matching record
    #[default]
    First,
    /// Sum of all matching values
    Sum,
    /// Mean of all matching values
    #[serde(alias = "mean")]
    Avg,
    /// Largest matching value
    Max,
}

impl Aggregation {
    /// Combine values, `None` when there are none
    pub fn combine<I>(self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter();
        match self {
            Aggregation::First => values.next(),
            Aggregation::Max => values.reduce(f64::max),
            Aggregation::Sum | Aggregation::Avg => {
                let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                match (count, self) {
                    (0, _) => None,
                    (_, Aggregation::Avg) => Some(sum / count as f64),
                    _ => Some(sum),
                }
            }
        }
    }
}

impl std::str::FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Aggregation::First),
            "sum" => Ok(Aggregation::Sum),
            "avg" | "mean" => Ok(Aggregation::Avg),
            "max" => Ok(Aggregation::Max),
            other => Err(format!("Unknown aggregation: {}", other)),
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Aggregation::First => "first",
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
        };
        f.write_str(s)
    }
}

/// Canonical metric name -> accepted alternative names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    aliases: BTreeMap<String, BTreeSet<String>>,
}

impl AliasTable {
    /// Empty table (exact-name matching only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Names used by older and newer simulator builds for the same quantity
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(crate::names::GW_BATTERY_REMAINING_MJ, "GW_Battery_mJ");
        table.insert(crate::names::CLOUD_AVG_DELAY_S, "Cloud_AvgDelay_s");
        table.insert(
            crate::names::SENSOR_AVG_BATTERY_MJ,
            crate::names::SENSOR_BATTERY_REMAINING_MJ,
        );
        table.insert(crate::names::SENSOR_AVG_BATTERY_MJ, "Sensor_EnergyRemaining_mJ");
        table
    }

    /// Register `alias` as another name for `canonical`
    pub fn insert(&mut self, canonical: impl Into<String>, alias: impl Into<String>) {
        self.aliases
            .entry(canonical.into())
            .or_default()
            .insert(alias.into());
    }

    /// Aliases registered for `canonical`
    pub fn aliases_of(&self, canonical: &str) -> impl Iterator<Item = &str> {
        self.aliases
            .get(canonical)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Whether a record named `name` counts toward `canonical`
    pub fn matches(&self, canonical: &str, name: &str) -> bool {
        name == canonical
            || self
                .aliases
                .get(canonical)
                .is_some_and(|set| set.contains(name))
    }

    /// Number of canonical names with at least one alias
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// True when no aliases are registered
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// A metric requested for every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Canonical metric name
    pub name: String,
    /// How duplicates across modules are combined
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Extra names accepted for this metric
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Only count records whose module path contains this substring
    #[serde(default)]
    pub module: Option<String>,
}

impl MetricSpec {
    /// Metric using the first matching record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregation: Aggregation::First,
            aliases: Vec::new(),
            module: None,
        }
    }

    /// Set the aggregation
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Restrict matching to modules containing `module`
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Accept another name for this metric
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Metrics reported by the gateway security simulation, with the aggregation
/// each one needs.
pub fn default_metric_specs() -> Vec<MetricSpec> {
    use crate::names::*;

    let mut specs: Vec<MetricSpec> = [
        CLOUD_TOTAL_RECEIVED,
        GW_RECEIVED,
        GW_FORWARDED,
        GW_DROPPED,
        GW_DROPPED_HMAC,
        GW_DROPPED_STALE,
        GW_DROPPED_DUPLICATE,
        GW_BATTERY_REMAINING_MJ,
        CLOUD_AVG_DELAY_S,
        FAKE_ATTACKS_SENT,
    ]
    .into_iter()
    .map(MetricSpec::new)
    .collect();
    specs.push(MetricSpec::new(SENSOR_AVG_BATTERY_MJ).with_aggregation(Aggregation::Avg));
    specs
}

/// Extracts metric values from scalar records through an alias table
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    aliases: AliasTable,
    default: f64,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new(AliasTable::new())
    }
}

impl MetricExtractor {
    /// Extractor with a default of `0.0`
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            aliases,
            default: 0.0,
        }
    }

    /// Extractor whose table also holds the aliases declared on `specs`
    pub fn for_specs(mut aliases: AliasTable, specs: &[MetricSpec]) -> Self {
        for spec in specs {
            for alias in &spec.aliases {
                aliases.insert(spec.name.clone(), alias.clone());
            }
        }
        Self::new(aliases)
    }

    /// Value returned by [`extract`](Self::extract) when nothing matches
    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }

    /// The alias table in use
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Extract `name`, falling back to the default when nothing matches
    pub fn extract(&self, records: &[ScalarRecord], name: &str, aggregation: Aggregation) -> f64 {
        self.try_extract(records, name, aggregation)
            .unwrap_or(self.default)
    }

    /// Extract `name`, or `None` when no record matches
    pub fn try_extract(
        &self,
        records: &[ScalarRecord],
        name: &str,
        aggregation: Aggregation,
    ) -> Option<f64> {
        aggregation.combine(
            records
                .iter()
                .filter(|r| self.aliases.matches(name, &r.name))
                .map(|r| r.value),
        )
    }

    /// Extract a configured metric, honouring its module filter
    pub fn try_extract_spec(&self, records: &[ScalarRecord], spec: &MetricSpec) -> Option<f64> {
        spec.aggregation.combine(
            records
                .iter()
                .filter(|r| self.aliases.matches(&spec.name, &r.name))
                .filter(|r| {
                    spec.module
                        .as_deref()
                        .map_or(true, |module| r.module.contains(module))
                })
                .map(|r| r.value),
        )
    }
}

/// Extract `name` with exact-name matching and a default of `0.0`.
pub fn extract_metric(records: &[ScalarRecord], name: &str, aggregation: Aggregation) -> f64 {
    MetricExtractor::default().extract(records, name, aggregation)
}
