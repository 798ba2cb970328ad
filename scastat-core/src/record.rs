//! Scalar record types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `scalar <module> <name> <value>` measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    /// Module path that recorded the value (e.g. `LightIoTNetwork.gateway`)
    pub module: String,
    /// Metric name (e.g. `GW_Dropped_HMAC`)
    pub name: String,
    /// Finite numeric value
    pub value: f64,
}

impl ScalarRecord {
    /// Create a record
    pub fn new(module: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            value,
        }
    }
}

/// Everything recognised in one scalar file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarDocument {
    /// Identifier from the first `run <id>` line, if any
    pub run_id: Option<String>,
    /// `attr <key> <value>` header lines
    pub attributes: BTreeMap<String, String>,
    /// Scalar records in file order
    pub records: Vec<ScalarRecord>,
}

impl ScalarDocument {
    /// Look up a run attribute such as `configname` or `repetition`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
