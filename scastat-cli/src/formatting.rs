//! Output Formatting
//!
//! Terminal-friendly rendering of a [`Report`]: one block per group with
//! mean, 95% CI half-width and sample count per metric, then any bootstrap
//! medians and their Secure-vs-NoSec change.

use scastat_report::Report;

/// Format a report for human-readable terminal display.
///
/// Values are printed with `precision` decimal places; metrics no run in
/// the group reported show as `—`.
pub fn format_human_output(report: &Report, precision: usize) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("scastat Summary\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "{} runs from {} files in {}\n\n",
        report.meta.inputs.runs, report.meta.inputs.files, report.meta.inputs.results_dir
    ));

    let width = report.metrics.iter().map(|m| m.len()).max().unwrap_or(0);

    for row in &report.groups {
        let nodes = row
            .nodes
            .map(|n| format!(", {} nodes", n))
            .unwrap_or_default();
        output.push_str(&format!(
            "Config: {} ({}{}, {} runs)\n",
            row.config, row.mode, nodes, row.summary.run_count
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for metric in &report.metrics {
            let line = match row.metric(metric) {
                Some(summary) => match (summary.mean, summary.ci95) {
                    (Some(mean), Some(ci95)) => format!(
                        "{:.*} ± {:.*}  (n={})",
                        precision, mean, precision, ci95, summary.sample_count
                    ),
                    (Some(mean), None) => {
                        format!("{:.*}  (n={})", precision, mean, summary.sample_count)
                    }
                    _ => "—".to_string(),
                },
                None => "—".to_string(),
            };
            output.push_str(&format!("  {:<width$}  {}\n", metric, line, width = width));
        }
        output.push('\n');
    }

    if !report.medians.is_empty() {
        output.push_str("Medians (bootstrap 95% CI)\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for median in &report.medians {
            if median.median.is_nan() {
                output.push_str(&format!("  {} {}: —\n", median.key, median.metric));
                continue;
            }
            output.push_str(&format!(
                "  {} {}: {:.*} [{:.*}, {:.*}] (n={})\n",
                median.key,
                median.metric,
                precision,
                median.median,
                precision,
                median.ci_low,
                precision,
                median.ci_high,
                median.runs
            ));
        }
        output.push('\n');
    }

    if !report.median_deltas.is_empty() {
        output.push_str("Median change, Secure vs NoSec\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for delta in &report.median_deltas {
            let change = if delta.delta_percent.is_nan() {
                "—".to_string()
            } else {
                format!("{:+.*}%", precision, delta.delta_percent)
            };
            output.push_str(&format!(
                "  {} nodes {}: {}\n",
                delta.nodes, delta.metric, change
            ));
        }
        output.push('\n');
    }

    output
}
