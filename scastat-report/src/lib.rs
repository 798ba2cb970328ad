#![warn(missing_docs)]
//! scastat Report - Output Formats
//!
//! Renders aggregation results as:
//! - JSON (full report with per-run values)
//! - CSV (per-config summary, per-run values, bootstrap medians)
//! - Markdown and LaTeX pivot tables (nodes x mode)

mod csv;
mod json;
mod report;
mod tables;

pub use csv::{generate_csv_report, generate_medians_csv, generate_runs_csv};
pub use json::generate_json_report;
pub use report::{
    ConfigRow, Report, ReportConfig, ReportInputs, ReportMeta, SCHEMA_VERSION,
};
pub use tables::{PivotTable, TableSpec, default_table_specs, generate_markdown_tables};

use thiserror::Error;

/// Errors while rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Buffer flush failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Rendered bytes were not UTF-8
    #[error("invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Per-config CSV summary
    Csv,
    /// Markdown pivot tables
    Markdown,
    /// LaTeX pivot tables
    Latex,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "latex" | "tex" => Ok(OutputFormat::Latex),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("tex".parse::<OutputFormat>(), Ok(OutputFormat::Latex));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
