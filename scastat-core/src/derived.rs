//! Derived Metrics
//!
//! Quantities computed from a run's raw scalars. The simulated duration and
//! the gateway's initial energy budget are explicit parameters: a derived
//! metric whose parameter is unset is not produced.

use crate::names::*;
use crate::run::RunResult;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Inputs for derived metrics that are not recorded in the result files
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedParams {
    /// Simulated time per run, in seconds
    #[serde(default)]
    pub sim_time_s: Option<f64>,
    /// Gateway battery capacity at start, in mJ
    #[serde(default)]
    pub gateway_initial_mj: Option<f64>,
}

/// What to do when a run lacks `GW_Received`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceivedPolicy {
    /// Only use the reported value; a missing total stays missing
    #[default]
    Reported,
    /// Fill a missing total with `forwarded + max(dropped, sum of drop reasons)`
    Reconstruct,
}

impl std::str::FromStr for ReceivedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reported" => Ok(ReceivedPolicy::Reported),
            "reconstruct" => Ok(ReceivedPolicy::Reconstruct),
            other => Err(format!("Unknown received policy: {}", other)),
        }
    }
}

/// Apply the received-total policy. Returns true when a value was filled in.
pub fn apply_received_policy(run: &mut RunResult, policy: ReceivedPolicy) -> bool {
    if policy == ReceivedPolicy::Reported || run.metric(GW_RECEIVED).is_some() {
        return false;
    }
    let Some(forwarded) = run.metric(GW_FORWARDED) else {
        return false;
    };

    let reasons: f64 = GW_DROP_REASONS.iter().filter_map(|n| run.metric(n)).sum();
    let dropped = run.metric(GW_DROPPED).unwrap_or(0.0).max(reasons);
    let received = forwarded + dropped;

    warn!(
        run = %run.run_id,
        received,
        "GW_Received missing; reconstructed from forwarded and drop counters"
    );
    run.metrics.insert(GW_RECEIVED.to_string(), received);
    true
}

/// Add derived metrics to a run in place.
pub fn apply_derived(run: &mut RunResult, params: &DerivedParams) {
    if let (Some(total), Some(sim_time)) = (run.metric(CLOUD_TOTAL_RECEIVED), params.sim_time_s) {
        if sim_time > 0.0 {
            run.metrics
                .insert(CLOUD_THROUGHPUT_MSGPS.to_string(), total / sim_time);
        }
    }

    if let (Some(initial), Some(remaining)) =
        (params.gateway_initial_mj, run.metric(GW_BATTERY_REMAINING_MJ))
    {
        let consumed = initial - remaining;
        run.metrics
            .insert(GW_ENERGY_CONSUMED_MJ.to_string(), consumed);
        if let Some(forwarded) = run.metric(GW_FORWARDED).filter(|f| *f != 0.0) {
            run.metrics
                .insert(GW_ENERGY_PER_FORWARDED_MJ.to_string(), consumed / forwarded);
        }
    }

    if let Some(attacks) = run.metric(FAKE_ATTACKS_SENT).filter(|a| *a > 0.0) {
        let detected: f64 = GW_DROP_REASONS.iter().filter_map(|n| run.metric(n)).sum();
        run.metrics.insert(
            ATTACK_DETECTION_RATE.to_string(),
            (detected / attacks).clamp(0.0, 1.0),
        );
    }
}

/// Names [`apply_derived`] can produce, for table column selection
pub fn derived_metric_names() -> [&'static str; 4] {
    [
        CLOUD_THROUGHPUT_MSGPS,
        GW_ENERGY_CONSUMED_MJ,
        GW_ENERGY_PER_FORWARDED_MJ,
        ATTACK_DETECTION_RATE,
    ]
}
