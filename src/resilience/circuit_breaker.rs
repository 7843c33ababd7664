//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Partial: a single trial call tests whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed  → Open:    trip policy fires after a failure (default: 5 failures, not necessarily consecutive)
//! Open    → Partial: next call after the reset policy allows it (default: 50ms after the last failure)
//! Partial → Closed:  trial call succeeds
//! Partial → Open:    trial call fails (regardless of the trip threshold)
//! any     → Closed:  reset()
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency
//! - The lock is held for decisions only, never across the protected call
//! - Only one trial call runs at a time; other callers are rejected while Partial
//! - Counters are zeroed on entering Closed or Partial
//! - Outcomes of calls admitted before the latest transition do not move
//!   counters or state; a late failure still pushes back the cooldown
//! - Subscribers are notified after the lock is released

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::BreakerConfig;
use crate::observability::metrics::{self, CallOutcome};
use crate::resilience::error::BreakerError;
use crate::resilience::policy::{ResetPolicy, TripPolicy};
use crate::resilience::state::{Snapshot, State};
use crate::resilience::subscription::{Notifier, StateSink, Transition};

const DEFAULT_NAME: &str = "default";

struct Inner {
    state: State,
    fail_count: u32,
    success_count: u32,
    last_failure: Option<Instant>,
    /// Bumped on every transition.
    epoch: u64,
}

/// A circuit breaker guarding calls to a single dependency.
///
/// ```
/// use std::time::Duration;
/// use breaker::{Breaker, State};
///
/// let cb = Breaker::new()
///     .trip_after(3)
///     .reset_after(Duration::from_millis(500));
///
/// let result: Result<u32, _> = cb.protect(|| Ok::<_, std::io::Error>(42));
/// assert_eq!(result.unwrap(), 42);
/// assert_eq!(cb.current_state(), State::Closed);
/// ```
pub struct Breaker {
    name: String,
    trip_policy: TripPolicy,
    reset_policy: ResetPolicy,
    inner: Mutex<Inner>,
    notifier: Notifier,
}

impl Breaker {
    /// Create a Closed breaker that trips after 5 failures and allows a
    /// trial call 50ms after the last failure.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            trip_policy: TripPolicy::default(),
            reset_policy: ResetPolicy::default(),
            inner: Mutex::new(Inner {
                state: State::Closed,
                fail_count: 0,
                success_count: 0,
                last_failure: None,
                epoch: 0,
            }),
            notifier: Notifier::new(State::Closed),
        }
    }

    /// Create a breaker from a validated configuration section.
    pub fn with_config(config: &BreakerConfig) -> Self {
        Self::new()
            .with_name(config.name.clone())
            .trip_after(config.trip_after)
            .reset_after(Duration::from_millis(config.reset_after_ms))
    }

    /// Name used in log fields and metric labels.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Trip after `n` failures. Failures need not be consecutive.
    pub fn trip_after(mut self, n: u32) -> Self {
        self.trip_policy = TripPolicy::Threshold(n);
        self
    }

    /// Allow a trial call once `cooldown` has elapsed since the last failure.
    pub fn reset_after(mut self, cooldown: Duration) -> Self {
        self.reset_policy = ResetPolicy::Cooldown(cooldown);
        self
    }

    /// Replace the trip policy, e.g. with [`TripPolicy::custom`].
    pub fn with_trip_policy(mut self, policy: TripPolicy) -> Self {
        self.trip_policy = policy;
        self
    }

    /// Replace the reset policy, e.g. with [`ResetPolicy::Manual`].
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    /// Name used in log fields and metric labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Policy deciding when Closed trips to Open.
    pub fn trip_policy(&self) -> &TripPolicy {
        &self.trip_policy
    }

    /// Policy deciding when Open admits a trial call.
    pub fn reset_policy(&self) -> &ResetPolicy {
        &self.reset_policy
    }

    /// The state as of the latest transition.
    pub fn current_state(&self) -> State {
        self.lock().state
    }

    /// Failures recorded since the breaker last entered Closed or Partial.
    pub fn fail_count(&self) -> u32 {
        self.lock().fail_count
    }

    /// Successes recorded since the breaker last entered Closed or Partial.
    pub fn success_count(&self) -> u32 {
        self.lock().success_count
    }

    /// When the most recent failure was recorded.
    pub fn last_failure(&self) -> Option<Instant> {
        self.lock().last_failure
    }

    /// State and counters read under one lock.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            name: self.name.clone(),
            state: inner.state,
            fail_count: inner.fail_count,
            success_count: inner.success_count,
        }
    }

    /// Run `f` under the breaker.
    ///
    /// Returns [`BreakerError::Open`] without calling `f` if the breaker is
    /// open and not yet ready for a trial, or if another caller's trial is
    /// already running. Otherwise `f` runs exactly once on the calling thread
    /// and its error, if any, is returned as [`BreakerError::Operation`].
    pub fn protect<T, E, F>(&self, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let Some(permit) = self.admit() else {
            return Err(BreakerError::Open);
        };

        match f() {
            Ok(value) => {
                permit.succeed();
                Ok(value)
            }
            Err(e) => {
                permit.fail();
                Err(BreakerError::Operation(e))
            }
        }
    }

    /// Async counterpart of [`protect`](Self::protect).
    ///
    /// A trial future dropped before it completes counts as a failed trial.
    pub async fn protect_async<T, E, F, Fut>(&self, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.admit() else {
            return Err(BreakerError::Open);
        };

        match f().await {
            Ok(value) => {
                permit.succeed();
                Ok(value)
            }
            Err(e) => {
                permit.fail();
                Err(BreakerError::Operation(e))
            }
        }
    }

    /// Force the breaker Closed with both counters at zero.
    ///
    /// The time of the last failure is kept. Subscribers are notified even
    /// if the breaker was already Closed.
    pub fn reset(&self) {
        let transition = {
            let mut inner = self.lock();
            tracing::debug!(breaker = %self.name, from = %inner.state, "Breaker reset");
            self.transition(&mut inner, State::Closed)
        };
        self.notifier.publish(transition);
    }

    /// Register a sink that receives the latest state after each transition.
    pub fn subscribe(&self) -> StateSink {
        self.notifier.subscribe()
    }

    /// Number of sinks that have not been dropped.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decide whether a call may run, moving Open to Partial when the reset
    /// policy allows it.
    fn admit(&self) -> Option<Permit<'_>> {
        let mut inner = self.lock();
        let state = inner.state;

        let transition = match state {
            State::Closed => None,
            State::Open => {
                if !self.reset_policy.should_reset(inner.last_failure, Instant::now()) {
                    drop(inner);
                    self.reject("open");
                    return None;
                }
                tracing::info!(breaker = %self.name, "Cooldown elapsed, admitting trial call");
                Some(self.transition(&mut inner, State::Partial))
            }
            State::Partial => {
                drop(inner);
                self.reject("trial in flight");
                return None;
            }
        };

        let permit = Permit {
            breaker: self,
            epoch: inner.epoch,
            trial: inner.state == State::Partial,
            settled: false,
        };
        drop(inner);

        self.notify(transition);
        Some(permit)
    }

    fn reject(&self, reason: &'static str) {
        tracing::debug!(breaker = %self.name, reason, "Call rejected");
        metrics::record_call(&self.name, CallOutcome::Rejected);
    }

    fn record_success(&self, epoch: u64) {
        metrics::record_call(&self.name, CallOutcome::Success);

        let transition = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                tracing::debug!(breaker = %self.name, "Discarding success from an earlier state");
                return;
            }

            let transition = if inner.state == State::Partial {
                tracing::info!(breaker = %self.name, "Trial call succeeded, closing breaker");
                Some(self.transition(&mut inner, State::Closed))
            } else {
                None
            };
            inner.success_count = inner.success_count.saturating_add(1);
            transition
        };

        self.notify(transition);
    }

    fn record_failure(&self, epoch: u64) {
        metrics::record_call(&self.name, CallOutcome::Failure);

        let transition = {
            let mut inner = self.lock();
            // The cooldown runs from the latest failure seen, stale or not.
            inner.last_failure = Some(Instant::now());
            if inner.epoch != epoch {
                tracing::debug!(breaker = %self.name, "Failure from an earlier state, counters unchanged");
                return;
            }

            inner.fail_count = inner.fail_count.saturating_add(1);

            let state = inner.state;
            match state {
                State::Partial => {
                    tracing::warn!(breaker = %self.name, "Trial call failed, reopening breaker");
                    Some(self.transition(&mut inner, State::Open))
                }
                State::Closed if self.trip_policy.should_trip(inner.fail_count) => {
                    tracing::warn!(
                        breaker = %self.name,
                        fail_count = inner.fail_count,
                        "Breaker tripped"
                    );
                    Some(self.transition(&mut inner, State::Open))
                }
                State::Closed => None,
                // Admission never hands out a permit for Open, and any transition
                // into Open bumps the epoch.
                State::Open => None,
            }
        };

        self.notify(transition);
    }

    /// Apply a transition under the lock. The returned [`Transition`] must be
    /// published once the lock is released.
    fn transition(&self, inner: &mut Inner, to: State) -> Transition {
        let from = inner.state;
        inner.state = to;
        inner.epoch += 1;
        if to != State::Open {
            inner.fail_count = 0;
            inner.success_count = 0;
        }

        tracing::debug!(breaker = %self.name, %from, %to, "State transition");
        metrics::record_transition(&self.name, to);
        Transition {
            epoch: inner.epoch,
            state: to,
        }
    }

    fn notify(&self, transition: Option<Transition>) {
        if let Some(transition) = transition {
            self.notifier.publish(transition);
        }
    }
}

impl Default for Breaker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Breaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Breaker")
            .field("name", &self.name)
            .field("state", &inner.state)
            .field("fail_count", &inner.fail_count)
            .field("success_count", &inner.success_count)
            .field("trip_policy", &self.trip_policy)
            .field("reset_policy", &self.reset_policy)
            .finish()
    }
}

/// Admission ticket for one call.
///
/// Dropped without an outcome (panic or cancelled future), a trial counts as
/// failed so the breaker cannot stay Partial forever; any other call is
/// simply forgotten.
struct Permit<'a> {
    breaker: &'a Breaker,
    epoch: u64,
    trial: bool,
    settled: bool,
}

impl Permit<'_> {
    fn succeed(mut self) {
        self.settled = true;
        self.breaker.record_success(self.epoch);
    }

    fn fail(mut self) {
        self.settled = true;
        self.breaker.record_failure(self.epoch);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            tracing::warn!(breaker = %self.breaker.name, "Trial call abandoned");
            self.breaker.record_failure(self.epoch);
        }
    }
}
