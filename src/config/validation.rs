//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold > 0, cooldown > 0, rates in 0..=1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("breaker.name must not be empty")]
    EmptyName,

    #[error("breaker.trip_after must be greater than 0")]
    ZeroTripThreshold,

    #[error("breaker.reset_after_ms must be greater than 0")]
    ZeroCooldown,

    #[error("simulation.failure_rate must be between 0.0 and 1.0, got {0}")]
    FailureRateOutOfRange(f64),

    #[error("observability.log_level must be one of trace, debug, info, warn, error; got {0:?}")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address is not a socket address: {0:?}")]
    InvalidMetricsAddress(String),
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.breaker.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if config.breaker.trip_after == 0 {
        errors.push(ValidationError::ZeroTripThreshold);
    }
    if config.breaker.reset_after_ms == 0 {
        errors.push(ValidationError::ZeroCooldown);
    }

    let rate = config.simulation.failure_rate;
    if !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::FailureRateOutOfRange(rate));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
