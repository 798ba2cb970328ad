//! Scalar names recorded by the gateway security simulation

#![allow(missing_docs)]

pub const CLOUD_TOTAL_RECEIVED: &str = "Cloud_TotalReceived";
pub const CLOUD_AVG_DELAY_S: &str = "Cloud_AvgEndToEndDelay_s";

pub const GW_RECEIVED: &str = "GW_Received";
pub const GW_FORWARDED: &str = "GW_Forwarded";
pub const GW_DROPPED: &str = "GW_Dropped";
pub const GW_DROPPED_HMAC: &str = "GW_Dropped_HMAC";
pub const GW_DROPPED_STALE: &str = "GW_Dropped_Stale";
pub const GW_DROPPED_DUPLICATE: &str = "GW_Dropped_Duplicate";
pub const GW_BATTERY_REMAINING_MJ: &str = "GW_BatteryRemaining_mJ";

pub const SENSOR_BATTERY_REMAINING_MJ: &str = "Sensor_BatteryRemaining_mJ";
pub const SENSOR_AVG_BATTERY_MJ: &str = "Sensor_AvgBattery_mJ";

pub const FAKE_ATTACKS_SENT: &str = "Fake_AttacksSent";

// Derived per run
pub const CLOUD_THROUGHPUT_MSGPS: &str = "Cloud_Throughput_msgps";
pub const GW_ENERGY_CONSUMED_MJ: &str = "GW_EnergyConsumed_mJ";
pub const GW_ENERGY_PER_FORWARDED_MJ: &str = "GW_EnergyPerForwarded_mJ";
pub const ATTACK_DETECTION_RATE: &str = "Attack_DetectionRate";

/// Per-reason gateway drop counters
pub const GW_DROP_REASONS: [&str; 3] = [GW_DROPPED_HMAC, GW_DROPPED_STALE, GW_DROPPED_DUPLICATE];
