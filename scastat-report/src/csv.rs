//! CSV Output
//!
//! Missing values are written as empty cells.

use crate::ReportError;
use crate::report::Report;

/// Per-group table: `Config, Mode, Nodes, n_runs`, then `<metric>_mean`,
/// `<metric>_ci95` for every metric.
pub fn generate_csv_report(report: &Report) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "Config".to_string(),
        "Mode".to_string(),
        "Nodes".to_string(),
        "n_runs".to_string(),
    ];
    for metric in &report.metrics {
        header.push(format!("{}_mean", metric));
        header.push(format!("{}_ci95", metric));
    }
    writer.write_record(&header)?;

    for row in &report.groups {
        let mut record = vec![
            row.config.clone(),
            row.mode.clone(),
            row.nodes.map(|n| n.to_string()).unwrap_or_default(),
            row.summary.run_count.to_string(),
        ];
        for metric in &report.metrics {
            let summary = row.metric(metric);
            record.push(cell(summary.and_then(|s| s.mean)));
            record.push(cell(summary.and_then(|s| s.ci95)));
        }
        writer.write_record(&record)?;
    }

    finish(writer)
}

/// Per-run table: `run_id, config, repetition`, then one column per metric.
pub fn generate_runs_csv(report: &Report) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "run_id".to_string(),
        "config".to_string(),
        "repetition".to_string(),
    ];
    header.extend(report.metrics.iter().cloned());
    writer.write_record(&header)?;

    let mut runs: Vec<_> = report.runs.iter().collect();
    runs.sort_by(|a, b| (&a.config, a.repetition).cmp(&(&b.config, b.repetition)));

    for run in runs {
        let mut record = vec![
            run.run_id.clone(),
            run.config.clone(),
            run.repetition.to_string(),
        ];
        record.extend(report.metrics.iter().map(|m| cell(run.metric(m))));
        writer.write_record(&record)?;
    }

    finish(writer)
}

/// Bootstrap medians: `Config, Metric, Median, CI95_low, CI95_high, runs`,
/// then `DeltaMedian_Sec_vs_NoSec_percent`, filled on `Secure` rows only.
pub fn generate_medians_csv(report: &Report) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Config",
        "Metric",
        "Median",
        "CI95_low",
        "CI95_high",
        "runs",
        "DeltaMedian_Sec_vs_NoSec_percent",
    ])?;

    for median in &report.medians {
        writer.write_record([
            median.key.clone(),
            median.metric.clone(),
            cell(Some(median.median)),
            cell(Some(median.ci_low)),
            cell(Some(median.ci_high)),
            median.runs.to_string(),
            cell(report.delta_for(median).map(|d| d.delta_percent)),
        ])?;
    }

    finish(writer)
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ReportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
