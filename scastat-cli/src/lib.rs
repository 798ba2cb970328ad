#![warn(missing_docs)]
//! scastat CLI Library
//!
//! Command-line front end: finds result files, runs the analysis pipeline and
//! writes or prints the report. `scastat::main` is a thin wrapper around
//! [`run`].
//!
//! ```text
//! scastat report --results-dir results --out-dir results
//! scastat summary --format markdown
//! scastat init > scastat.toml
//! ```

mod config;
mod discovery;
mod formatting;
mod pipeline;

pub use config::*;
pub use discovery::{DiscoveryError, discover_result_files, run_id_for};
pub use formatting::format_human_output;
pub use pipeline::{
    AnalysisSettings, GroupBy, analyze, analyze_runs, load_runs, report_metrics,
    resolve_metric_name,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use scastat_core::ReceivedPolicy;
use scastat_report::{
    OutputFormat, PivotTable, Report, TableSpec, generate_csv_report, generate_json_report,
    generate_markdown_tables, generate_medians_csv, generate_runs_csv,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// scastat CLI arguments
#[derive(Parser, Debug)]
#[command(name = "scastat")]
#[command(
    author,
    version,
    about = "scastat - aggregate simulator scalar results into tables with confidence intervals"
)]
pub struct Cli {
    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: nearest scastat.toml above the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate results and write every output file into a directory
    Report {
        /// Input selection and analysis options
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Directory for output files (default: config or `results`)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Aggregate results and print a single format
    Summary {
        /// Input selection and analysis options
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format: human, json, csv, markdown, latex
        #[arg(long)]
        format: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a default scastat.toml
    Init,
}

/// Options shared by `report` and `summary`; each overrides scastat.toml
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Directory holding the result files
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Only aggregate configs matching this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Row grouping: config or mode
    #[arg(long, default_value = "config")]
    pub group_by: String,

    /// Missing GW_Received handling: reported or reconstruct
    #[arg(long)]
    pub received_policy: Option<String>,

    /// Simulated seconds per run (enables throughput)
    #[arg(long)]
    pub sim_time: Option<f64>,

    /// Gateway battery at start in mJ (enables energy metrics)
    #[arg(long)]
    pub gateway_initial_mj: Option<f64>,

    /// Summarise this metric by median with a bootstrap CI
    #[arg(long)]
    pub median_metric: Option<String>,

    /// Bootstrap resamples for --median-metric
    #[arg(long)]
    pub bootstrap_iterations: Option<usize>,

    /// Bootstrap RNG seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run the scastat CLI with process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the scastat CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging; a subscriber may already be set when embedded
    let filter = if cli.verbose {
        "scastat=debug"
    } else {
        "scastat=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Init => {
            print!("{}", ScastatConfig::default_toml());
        }
        Commands::Report { analysis, out_dir } => {
            let config = load_config(cli.config.as_deref())?;
            let settings = resolve_settings(&analysis, &config)?;
            let out_dir = out_dir.unwrap_or_else(|| PathBuf::from(&config.output.directory));
            let report = analyze(&settings)?;
            let written = write_report_files(&report, &config.table_specs(), &out_dir)?;
            println!(
                "Aggregated {} runs into {} groups; wrote {} files to {}",
                report.run_count(),
                report.groups.len(),
                written.len(),
                out_dir.display()
            );
        }
        Commands::Summary {
            analysis,
            format,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let settings = resolve_settings(&analysis, &config)?;
            let format = format
                .as_deref()
                .unwrap_or(&config.output.format)
                .parse::<OutputFormat>()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let report = analyze(&settings)?;
            let rendered = render(&report, format, &config.table_specs(), settings.precision)?;
            match output {
                Some(path) => {
                    write_file(&path, &rendered)?;
                    info!(path = %path.display(), "wrote summary");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(rendered.as_bytes())?;
                    stdout.flush()?;
                }
            }
        }
    }

    Ok(())
}

/// Explicit `--config` path, else the discovered scastat.toml, else defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<ScastatConfig> {
    match path {
        Some(path) => ScastatConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ScastatConfig::discover()
            .context("Failed to load scastat.toml")?
            .unwrap_or_default()),
    }
}

/// Layer CLI flags over the configuration file.
pub fn resolve_settings(
    args: &AnalysisArgs,
    config: &ScastatConfig,
) -> anyhow::Result<AnalysisSettings> {
    let results_dir = args
        .results_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.results_dir));

    let config_filter = args
        .filter
        .as_deref()
        .or(config.input.config_filter.as_deref())
        .map(|pattern| {
            Regex::new(pattern).with_context(|| format!("Invalid config filter: {}", pattern))
        })
        .transpose()?;

    let received_policy = match &args.received_policy {
        Some(policy) => policy
            .parse::<ReceivedPolicy>()
            .map_err(|e| anyhow::anyhow!(e))?,
        None => config.derived.received_policy,
    };

    let mut derived = config.derived.params();
    if args.sim_time.is_some() {
        derived.sim_time_s = args.sim_time;
    }
    if args.gateway_initial_mj.is_some() {
        derived.gateway_initial_mj = args.gateway_initial_mj;
    }

    let mut bootstrap = config.bootstrap.to_config();
    if let Some(iterations) = args.bootstrap_iterations {
        bootstrap.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        bootstrap.seed = seed;
    }

    Ok(AnalysisSettings {
        results_dir,
        extension: config.input.extension.clone(),
        recursive: config.input.recursive,
        config_filter,
        metrics: config.metric_specs(),
        received_policy,
        derived,
        group_by: args.group_by.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        bootstrap,
        median_metric: args.median_metric.clone(),
        precision: config.output.precision,
    })
}

/// Render one output format as a string
pub fn render(
    report: &Report,
    format: OutputFormat,
    tables: &[TableSpec],
    precision: u32,
) -> anyhow::Result<String> {
    if matches!(format, OutputFormat::Markdown | OutputFormat::Latex) && !has_node_counts(report) {
        anyhow::bail!("Pivot tables need node counts in the group keys; use --group-by config");
    }
    Ok(match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Csv => generate_csv_report(report)?,
        OutputFormat::Markdown => generate_markdown_tables(report, tables),
        OutputFormat::Latex => tables
            .iter()
            .map(|spec| PivotTable::from_report(report, spec).to_latex())
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Human => format_human_output(report, precision as usize),
    })
}

/// Write the full output set into `out_dir`; returns the paths written.
pub fn write_report_files(
    report: &Report,
    tables: &[TableSpec],
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut outputs: Vec<(String, String)> = vec![
        ("summary_by_config.csv".to_string(), generate_csv_report(report)?),
        ("summary_by_run.csv".to_string(), generate_runs_csv(report)?),
    ];
    let pivot = has_node_counts(report);
    if pivot {
        outputs.push(("tables.md".to_string(), generate_markdown_tables(report, tables)));
    } else {
        info!(
            group_by = %report.meta.config.group_by,
            "no node counts in group keys; skipping pivot tables"
        );
    }
    outputs.push(("summary.json".to_string(), generate_json_report(report)?));
    if pivot {
        for spec in tables {
            let table = PivotTable::from_report(report, spec);
            outputs.push((format!("table_{}.tex", spec.id), table.to_latex() + "\n"));
        }
    }
    if !report.medians.is_empty() {
        outputs.push(("medians.csv".to_string(), generate_medians_csv(report)?));
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (name, content) in outputs {
        let path = out_dir.join(name);
        write_file(&path, &content)?;
        info!(path = %path.display(), "wrote");
        written.push(path);
    }
    Ok(written)
}

/// Pivot tables have rows only when some group key carries a node count
fn has_node_counts(report: &Report) -> bool {
    report.groups.iter().any(|g| g.nodes.is_some())
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
