//! Pivot Tables
//!
//! Nodes-by-mode tables of one metric's mean, rendered as Markdown or LaTeX
//! (booktabs). Missing cells render as `—` in Markdown and `--` in LaTeX.

use crate::report::Report;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Column order for the core security modes; other series follow alphabetically
const PREFERRED_SERIES: [&str; 3] = ["NoSec", "Secure", "Attack"];

/// Which metric a pivot table shows and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Short identifier, used for the LaTeX label and file name
    pub id: String,
    /// Caption / heading
    pub title: String,
    /// Unit shown after the title
    #[serde(default)]
    pub unit: String,
    /// Metric whose mean fills the cells
    pub metric: String,
    /// Multiplier applied to every cell (e.g. 1000 for s -> ms)
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Decimal places in cells
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

fn default_scale() -> f64 {
    1.0
}
fn default_decimals() -> usize {
    3
}

impl TableSpec {
    /// Table of `metric` with unit scale
    pub fn new(id: impl Into<String>, title: impl Into<String>, metric: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit: String::new(),
            metric: metric.into(),
            scale: default_scale(),
            decimals: default_decimals(),
        }
    }

    /// Set the unit label
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the cell multiplier
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    fn heading(&self) -> String {
        if self.unit.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.unit)
        }
    }
}

/// Delay, drop and energy tables used in the thesis write-up
pub fn default_table_specs() -> Vec<TableSpec> {
    vec![
        TableSpec::new(
            "delay",
            "Mean End-to-End Delay vs Nodes",
            "Cloud_AvgEndToEndDelay_s",
        )
        .with_unit("ms")
        .with_scale(1000.0),
        TableSpec::new("drops", "Gateway Drops vs Nodes", "GW_Dropped").with_unit("count"),
        TableSpec::new(
            "energy",
            "Gateway Energy Remaining vs Nodes",
            "GW_BatteryRemaining_mJ",
        )
        .with_unit("mJ"),
    ]
}

/// A nodes x series grid of scaled means
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    /// Table definition
    pub spec: TableSpec,
    /// Series labels, in column order
    pub columns: Vec<String>,
    /// `(nodes, cells)` in ascending node order; `cells[i]` matches `columns[i]`
    pub rows: Vec<(u32, Vec<Option<f64>>)>,
}

impl PivotTable {
    /// Pivot the report's group rows. Groups without a node count are left out.
    ///
    /// Configs that land in the same cell (`Secure50_record` and
    /// `Secure50_CI` both map to `Secure` at 50 nodes) are averaged.
    pub fn from_report(report: &Report, spec: &TableSpec) -> Self {
        let mut cells: BTreeMap<(u32, &str), Vec<f64>> = BTreeMap::new();
        let mut series: BTreeSet<&str> = BTreeSet::new();

        for row in &report.groups {
            let Some(nodes) = row.nodes else { continue };
            series.insert(row.series.as_str());
            if let Some(mean) = row.metric(&spec.metric).and_then(|m| m.mean) {
                cells
                    .entry((nodes, row.series.as_str()))
                    .or_default()
                    .push(mean * spec.scale);
            }
        }

        let mut columns: Vec<String> = PREFERRED_SERIES
            .iter()
            .filter(|s| series.contains(*s))
            .map(|s| s.to_string())
            .collect();
        columns.extend(
            series
                .iter()
                .filter(|s| !PREFERRED_SERIES.contains(s))
                .map(|s| s.to_string()),
        );

        let nodes: BTreeSet<u32> = report.groups.iter().filter_map(|g| g.nodes).collect();
        let rows = nodes
            .into_iter()
            .map(|n| {
                let row = columns
                    .iter()
                    .map(|c| {
                        cells
                            .get(&(n, c.as_str()))
                            .map(|v| v.iter().sum::<f64>() / v.len() as f64)
                    })
                    .collect();
                (n, row)
            })
            .collect();

        Self {
            spec: spec.clone(),
            columns,
            rows,
        }
    }

    /// Markdown table with a `###` heading
    pub fn to_markdown(&self) -> String {
        let mut lines = vec![format!("### {}", self.spec.heading()), String::new()];

        let mut header = String::from("| Nodes |");
        let mut rule = String::from("|---:|");
        for column in &self.columns {
            header.push_str(&format!(" {} |", column));
            rule.push_str(":---:|");
        }
        lines.push(header);
        lines.push(rule);

        for (nodes, cells) in &self.rows {
            let mut line = format!("| {} |", nodes);
            for cell in cells {
                line.push_str(&format!(" {} |", self.format_cell(*cell, "—")));
            }
            lines.push(line);
        }

        lines.push(String::new());
        lines.join("\n")
    }

    /// LaTeX `table` environment using booktabs rules
    pub fn to_latex(&self) -> String {
        let mut lines = vec![
            r"\begin{table}[h]".to_string(),
            r"\centering".to_string(),
            format!(r"\caption{{{}}}", latex_escape(&self.spec.heading())),
            format!(r"\label{{tab:{}}}", self.spec.id),
            format!(r"\begin{{tabular}}{{r{}}}", "c".repeat(self.columns.len())),
            r"\toprule".to_string(),
        ];

        let mut header = String::from("Nodes");
        for column in &self.columns {
            header.push_str(" & ");
            header.push_str(&latex_escape(column));
        }
        header.push_str(r" \\ \midrule");
        lines.push(header);

        for (nodes, cells) in &self.rows {
            let mut line = nodes.to_string();
            for cell in cells {
                line.push_str(" & ");
                line.push_str(&self.format_cell(*cell, "--"));
            }
            line.push_str(r" \\");
            lines.push(line);
        }

        lines.push(r"\bottomrule".to_string());
        lines.push(r"\end{tabular}".to_string());
        lines.push(r"\end{table}".to_string());
        lines.join("\n")
    }

    fn format_cell(&self, value: Option<f64>, missing: &str) -> String {
        match value {
            Some(v) if v.is_finite() => format!("{:.*}", self.spec.decimals, v),
            _ => missing.to_string(),
        }
    }
}

/// Render every table as one Markdown document
pub fn generate_markdown_tables(report: &Report, specs: &[TableSpec]) -> String {
    specs
        .iter()
        .map(|spec| PivotTable::from_report(report, spec).to_markdown())
        .collect::<Vec<_>>()
        .join("\n")
}

fn latex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '_' | '%' | '&' | '#' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
