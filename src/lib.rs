//! Circuit breaker for protecting calls to an unreliable dependency.
//!
//! A [`Breaker`] counts failures of the calls it wraps. Once its trip policy
//! fires it rejects calls without running them, waits out a cooldown, then
//! lets a single trial call decide whether to close again or stay open.
//! Subscribers get the latest state after every transition.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod simulation;

pub use config::schema::{AppConfig, BreakerConfig};
pub use resilience::{
    Breaker, BreakerError, ResetPolicy, ResetStrategy, Snapshot, State, StateSink, TripPolicy,
    TripStrategy,
};
