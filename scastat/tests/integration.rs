//! Integration tests for scastat
//!
//! These tests exercise the crates together: scalar text in, summaries and
//! report files out.

use clap::Parser;
use scastat::{
    Aggregation, AliasTable, BootstrapConfig, Cli, MetricExtractor, MetricSpec, RunResult,
    by_config, extract_metric, median_ci95, parse, parse_document, read_scalar_file, run_with_cli,
    summarize, summarize_medians,
};
use std::fs;

/// Parsing twice gives the same records, in file order, skipping noise
#[test]
fn test_parse_is_idempotent_and_ordered() {
    let lines = [
        "version 3",
        "run Secure5-0",
        "scalar net.gw GW_Forwarded 40",
        "scalar net.gw broken",
        "statistic net.gw hist",
        "scalar net.cloud Cloud_TotalReceived 38 extra tokens",
        "scalar net.gw GW_Dropped nan",
        "scalar net.gw GW_Dropped 2",
    ];

    let first = parse(lines);
    let second = parse(lines);
    assert_eq!(first, second);

    let names: Vec<_> = first.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["GW_Forwarded", "Cloud_TotalReceived", "GW_Dropped"]);
    assert_eq!(first[1].value, 38.0);
}

/// Aggregation modes over duplicate records
#[test]
fn test_extraction_modes() {
    let single = parse(["scalar A B 3.5"]);
    assert_eq!(extract_metric(&single, "B", Aggregation::First), 3.5);

    let records = parse(["scalar M1 N 2.0", "scalar M2 N 3.0"]);
    assert_eq!(extract_metric(&records, "N", Aggregation::First), 2.0);
    assert_eq!(extract_metric(&records, "N", Aggregation::Sum), 5.0);
    assert_eq!(extract_metric(&records, "N", Aggregation::Avg), 2.5);
    assert_eq!(extract_metric(&records, "N", Aggregation::Max), 3.0);
    assert_eq!(extract_metric(&records, "Missing", Aggregation::Sum), 0.0);
}

/// Mean and CI of one and three samples
#[test]
fn test_summary_statistics() {
    let runs = vec![RunResult::new("One-0").with_metric("X", 10.0)];
    let out = summarize(&runs, by_config, &["X"]).unwrap();
    let x = out["One"].metric("X").unwrap();
    assert_eq!(x.mean, Some(10.0));
    assert_eq!(x.ci95, Some(0.0));

    let runs: Vec<_> = [1.0, 2.0, 3.0]
        .iter()
        .enumerate()
        .map(|(i, v)| RunResult::new(format!("Three-{}", i)).with_metric("X", *v))
        .collect();
    let out = summarize(&runs, by_config, &["X"]).unwrap();
    let x = out["Three"].metric("X").unwrap();
    assert_eq!(x.mean, Some(2.0));
    assert!((x.ci95.unwrap() - 1.96 / 3f64.sqrt()).abs() < 1e-6);
}

/// Bootstrap edge cases and reproducibility
#[test]
fn test_bootstrap_properties() {
    assert_eq!(median_ci95(&[5.0], 100, 1), (5.0, 5.0));

    let (low, high) = median_ci95(&[], 100, 1);
    assert!(low.is_nan() && high.is_nan());

    let sample = [3.1, 0.4, 7.7, 2.2, 9.0, 5.5, 1.3];
    let a = median_ci95(&sample, 2000, 42);
    let b = median_ci95(&sample, 2000, 42);
    assert_eq!(a.0.to_bits(), b.0.to_bits());
    assert_eq!(a.1.to_bits(), b.1.to_bits());
    assert!(a.0 <= 3.1 && a.1 >= 3.1);
}

/// Two result files for one config: mean 5, n 2, CI 1.96
#[test]
fn test_two_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Secure5-0.sca"),
        "scalar net.gw GW_Dropped_HMAC 4.0\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("Secure5-1.sca"),
        "scalar net.gw GW_Dropped_HMAC 6.0\n",
    )
    .unwrap();

    let specs = vec![MetricSpec::new("GW_Dropped_HMAC")];
    let extractor = MetricExtractor::for_specs(AliasTable::builtin(), &specs);
    let runs: Vec<_> = ["Secure5-0", "Secure5-1"]
        .iter()
        .map(|id| {
            let doc = read_scalar_file(dir.path().join(format!("{}.sca", id))).unwrap();
            RunResult::from_document(id, &doc, &specs, &extractor)
        })
        .collect();

    let out = summarize(&runs, by_config, &["GW_Dropped_HMAC"]).unwrap();
    let hmac = out["Secure5"].metric("GW_Dropped_HMAC").unwrap();
    assert_eq!(hmac.mean, Some(5.0));
    assert_eq!(hmac.sample_count, 2);
    assert!((hmac.ci95.unwrap() - 1.96).abs() < 1e-9);

    let medians =
        summarize_medians(&runs, by_config, "GW_Dropped_HMAC", &BootstrapConfig::default())
            .unwrap();
    assert_eq!(medians[0].median, 5.0);
    assert!(medians[0].ci_low >= 4.0 && medians[0].ci_high <= 6.0);
}

/// Alias names and module filters resolve through one table
#[test]
fn test_aliases_and_module_filter() {
    let doc = parse_document([
        "scalar net.gateway GW_Battery_mJ 4200",
        "scalar net.sensor[0] Sensor_EnergyRemaining_mJ 10",
        "scalar net.sensor[1] Sensor_BatteryRemaining_mJ 30",
        "scalar net.gateway Sensor_BatteryRemaining_mJ 999",
    ]);
    let specs = vec![
        MetricSpec::new("GW_BatteryRemaining_mJ"),
        MetricSpec::new("Sensor_AvgBattery_mJ")
            .with_aggregation(Aggregation::Avg)
            .in_module("sensor"),
    ];
    let extractor = MetricExtractor::for_specs(AliasTable::builtin(), &specs);
    let run = RunResult::from_document("Secure5_record-0", &doc, &specs, &extractor);

    assert_eq!(run.metric("GW_BatteryRemaining_mJ"), Some(4200.0));
    assert_eq!(run.metric("Sensor_AvgBattery_mJ"), Some(20.0));
}

/// `scastat report` writes the full output set
#[test]
fn test_cli_report_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("Secure5_record-0.sca"),
        "scalar net.gw GW_Dropped 4\nscalar net.cloud Cloud_AvgEndToEndDelay_s 0.010\n",
    )
    .unwrap();
    fs::write(
        input.path().join("Secure5_record-1.sca"),
        "scalar net.gw GW_Dropped 6\nscalar net.cloud Cloud_AvgEndToEndDelay_s 0.012\n",
    )
    .unwrap();
    fs::write(
        input.path().join("Attack5_record-0.sca"),
        "scalar net.gw GW_Dropped 40\n",
    )
    .unwrap();
    let config = out.path().join("scastat.toml");
    fs::write(&config, "").unwrap();

    let cli = Cli::try_parse_from([
        "scastat".to_string(),
        "report".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--results-dir".to_string(),
        input.path().display().to_string(),
        "--out-dir".to_string(),
        out.path().display().to_string(),
        "--median-metric".to_string(),
        "GW_Dropped".to_string(),
    ])
    .unwrap();
    run_with_cli(cli).unwrap();

    for name in [
        "summary_by_config.csv",
        "summary_by_run.csv",
        "tables.md",
        "table_delay.tex",
        "table_drops.tex",
        "table_energy.tex",
        "summary.json",
        "medians.csv",
    ] {
        assert!(out.path().join(name).is_file(), "missing {}", name);
    }

    let by_config = fs::read_to_string(out.path().join("summary_by_config.csv")).unwrap();
    let secure = by_config
        .lines()
        .find(|l| l.starts_with("Secure5_record,"))
        .unwrap();
    assert!(secure.starts_with("Secure5_record,Secure,5,2,"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(json["meta"]["inputs"]["runs"], 3);
    assert_eq!(json["groups"].as_array().unwrap().len(), 2);

    let tex = fs::read_to_string(out.path().join("table_drops.tex")).unwrap();
    assert!(tex.contains(r"5 & 5.000 & 40.000 \\"));
}

/// Missing results directory fails the run
#[test]
fn test_cli_missing_results_dir() {
    let out = tempfile::tempdir().unwrap();
    let config = out.path().join("scastat.toml");
    fs::write(&config, "").unwrap();

    let cli = Cli::try_parse_from([
        "scastat".to_string(),
        "summary".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--results-dir".to_string(),
        out.path().join("absent").display().to_string(),
    ])
    .unwrap();
    let err = run_with_cli(cli).unwrap_err();
    assert!(err.to_string().contains("results directory not found"));
}
