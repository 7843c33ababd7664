//! Simulated flaky dependency driven through a breaker.
//!
//! # Responsibilities
//! - Model a dependency with random failures and a hard outage window
//! - Drive calls through a [`Breaker`] at a fixed pace until done or stopped
//! - Report outcomes and the transitions a subscriber observed
//!
//! # Design Decisions
//! - The observer polls its sink after every call, so transitions that happen
//!   within one call (Partial then Closed) show up as the latest state only

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::resilience::{Breaker, BreakerError, Snapshot, State};

/// Failure returned by the simulated dependency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("dependency unavailable (outage) on call {0}")]
    Outage(u64),

    #[error("transient dependency failure on call {0}")]
    Transient(u64),
}

/// A dependency that fails at random and goes fully down for a window of calls.
#[derive(Debug, Clone)]
pub struct FlakyDependency {
    config: SimulationConfig,
}

impl FlakyDependency {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    fn in_outage(&self, call: u64) -> bool {
        match self.config.outage_after {
            Some(start) => call >= start && call - start < self.config.outage_calls,
            None => false,
        }
    }

    /// Perform call number `call`.
    pub async fn call(&self, call: u64) -> Result<u64, DependencyError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.in_outage(call) {
            return Err(DependencyError::Outage(call));
        }
        if fastrand::f64() < self.config.failure_rate {
            return Err(DependencyError::Transient(call));
        }
        Ok(call)
    }
}

/// Summary of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub rejected: u64,
    /// States observed by a subscriber, in order.
    pub observed: Vec<State>,
    pub breaker: Snapshot,
}

/// Drive `config.calls` calls through `breaker`, stopping early once `stop`
/// resolves. A call already in flight is allowed to finish.
pub async fn run(
    breaker: &Breaker,
    config: &SimulationConfig,
    stop: impl Future<Output = ()>,
) -> SimulationReport {
    let dependency = FlakyDependency::new(config.clone());
    let mut sink = breaker.subscribe();
    tokio::pin!(stop);
    let mut ticker = tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));

    let mut attempted = 0;
    let mut succeeded = 0;
    let mut failed = 0;
    let mut rejected = 0;
    let mut observed = Vec::new();

    tracing::info!(
        breaker = breaker.name(),
        calls = config.calls,
        failure_rate = config.failure_rate,
        "Simulation starting"
    );

    for call in 0..config.calls {
        tokio::select! {
            biased;
            () = &mut stop => {
                tracing::info!(call, "Simulation interrupted");
                break;
            }
            _ = ticker.tick() => {}
        }

        attempted += 1;
        match breaker.protect_async(|| dependency.call(call)).await {
            Ok(_) => succeeded += 1,
            Err(BreakerError::Open) => rejected += 1,
            Err(BreakerError::Operation(e)) => {
                tracing::debug!(error = %e, "Dependency call failed");
                failed += 1;
            }
        }

        while let Some(state) = sink.try_recv() {
            tracing::info!(breaker = breaker.name(), %state, call, "State change observed");
            observed.push(state);
        }
    }

    SimulationReport {
        attempted,
        succeeded,
        failed,
        rejected,
        observed,
        breaker: breaker.snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;

    fn deterministic(calls: u64, outage_after: Option<u64>, outage_calls: u64) -> SimulationConfig {
        SimulationConfig {
            calls,
            interval_ms: 1,
            latency_ms: 0,
            failure_rate: 0.0,
            outage_after,
            outage_calls,
        }
    }

    #[tokio::test]
    async fn test_outage_trips_breaker() {
        let breaker = Breaker::new()
            .with_name("sim")
            .trip_after(2)
            .reset_after(Duration::from_secs(60));
        let config = deterministic(10, Some(3), 5);

        let report = run(&breaker, &config, future::pending()).await;

        assert_eq!(report.attempted, 10);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(report.rejected, 5);
        assert_eq!(report.observed, vec![State::Open]);
        assert_eq!(report.breaker.state, State::Open);
        assert_eq!(report.breaker.name, "sim");
    }

    #[tokio::test]
    async fn test_healthy_dependency() {
        let breaker = Breaker::new();
        let report = run(&breaker, &deterministic(5, None, 0), future::pending()).await;

        assert_eq!(report.succeeded, 5);
        assert!(report.observed.is_empty());
        assert_eq!(report.breaker.success_count, 5);
    }

    #[tokio::test]
    async fn test_stop_ends_run_early() {
        let breaker = Breaker::new();
        let config = deterministic(1_000, None, 0);

        let stop = tokio::time::sleep(Duration::from_millis(20));
        let report = run(&breaker, &config, stop).await;

        assert!(report.attempted > 0);
        assert!(report.attempted < 1_000);
        assert_eq!(report.attempted, report.succeeded);
    }

    #[tokio::test]
    async fn test_stop_already_resolved_issues_no_calls() {
        let breaker = Breaker::new();
        let report = run(&breaker, &deterministic(10, None, 0), future::ready(())).await;

        assert_eq!(report.attempted, 0);
        assert_eq!(report.breaker.success_count, 0);
    }

    #[test]
    fn test_outage_window() {
        let dependency = FlakyDependency::new(deterministic(0, Some(10), 3));
        assert!(!dependency.in_outage(9));
        assert!(dependency.in_outage(10));
        assert!(dependency.in_outage(12));
        assert!(!dependency.in_outage(13));
    }
}
