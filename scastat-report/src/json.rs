//! JSON Output

use crate::ReportError;
use crate::report::Report;

/// Pretty-printed JSON of the whole report, including per-run values.
pub fn generate_json_report(report: &Report) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}
