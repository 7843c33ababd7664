//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::resilience::policy::{DEFAULT_RESET_AFTER, DEFAULT_TRIP_AFTER};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Breaker settings.
    pub breaker: BreakerConfig,

    /// Simulated dependency, read by `breaker-sim` only.
    pub simulation: SimulationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Label for logs and metrics.
    pub name: String,

    /// Failures (not necessarily consecutive) before the breaker trips.
    pub trip_after: u32,

    /// Cooldown after the last failure before a trial call, in milliseconds.
    pub reset_after_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            trip_after: DEFAULT_TRIP_AFTER,
            reset_after_ms: DEFAULT_RESET_AFTER.as_millis() as u64,
        }
    }
}

/// Flaky dependency driven by the simulator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of calls to attempt.
    pub calls: u64,

    /// Delay between calls, in milliseconds.
    pub interval_ms: u64,

    /// Simulated latency of each call, in milliseconds.
    pub latency_ms: u64,

    /// Probability (0.0 to 1.0) that a call fails outside an outage.
    pub failure_rate: f64,

    /// Call index at which a hard outage starts.
    pub outage_after: Option<u64>,

    /// Number of calls the outage lasts.
    pub outage_calls: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            calls: 200,
            interval_ms: 10,
            latency_ms: 2,
            failure_rate: 0.1,
            outage_after: Some(40),
            outage_calls: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9000".to_string(),
        }
    }
}
