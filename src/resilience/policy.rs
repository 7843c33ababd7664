//! Trip and reset policies.
//!
//! # Responsibilities
//! - Decide when a Closed breaker trips to Open
//! - Decide when an Open breaker may admit a trial call
//!
//! # Design Decisions
//! - Built-in policies are plain enum variants, custom ones go through a trait
//! - Policies are pure functions of the values passed in; they hold no state
//!   of the breaker they are attached to

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of failures before the breaker trips.
pub const DEFAULT_TRIP_AFTER: u32 = 5;

/// Default cooldown between the last failure and the next trial call.
pub const DEFAULT_RESET_AFTER: Duration = Duration::from_millis(50);

/// Custom trip decision.
pub trait TripStrategy: Send + Sync {
    /// Called after every failure recorded while Closed.
    fn should_trip(&self, fail_count: u32) -> bool;
}

/// Custom reset decision.
pub trait ResetStrategy: Send + Sync {
    /// Called when a call arrives while Open.
    fn should_reset(&self, last_failure: Option<Instant>, now: Instant) -> bool;
}

/// Decides whether a Closed breaker should trip.
#[derive(Clone)]
pub enum TripPolicy {
    /// Trip once the cumulative failure count reaches the threshold.
    /// Failures need not be consecutive.
    Threshold(u32),
    /// Never trip on failures.
    Never,
    /// Caller-supplied strategy.
    Custom(Arc<dyn TripStrategy>),
}

impl TripPolicy {
    pub fn custom<S: TripStrategy + 'static>(strategy: S) -> Self {
        TripPolicy::Custom(Arc::new(strategy))
    }

    pub fn should_trip(&self, fail_count: u32) -> bool {
        match self {
            TripPolicy::Threshold(n) => fail_count >= *n,
            TripPolicy::Never => false,
            TripPolicy::Custom(strategy) => strategy.should_trip(fail_count),
        }
    }
}

impl Default for TripPolicy {
    fn default() -> Self {
        TripPolicy::Threshold(DEFAULT_TRIP_AFTER)
    }
}

impl fmt::Debug for TripPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripPolicy::Threshold(n) => f.debug_tuple("Threshold").field(n).finish(),
            TripPolicy::Never => f.write_str("Never"),
            TripPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Decides whether an Open breaker may move to Partial.
#[derive(Clone)]
pub enum ResetPolicy {
    /// Allow a trial once strictly more than the cooldown has elapsed since
    /// the last recorded failure.
    Cooldown(Duration),
    /// Stay Open until [`Breaker::reset`](super::Breaker::reset) is called.
    Manual,
    /// Caller-supplied strategy.
    Custom(Arc<dyn ResetStrategy>),
}

impl ResetPolicy {
    pub fn custom<S: ResetStrategy + 'static>(strategy: S) -> Self {
        ResetPolicy::Custom(Arc::new(strategy))
    }

    pub fn should_reset(&self, last_failure: Option<Instant>, now: Instant) -> bool {
        match self {
            ResetPolicy::Cooldown(cooldown) => match last_failure {
                // A breaker with no recorded failure has nothing to cool down from.
                None => true,
                Some(at) => match at.checked_add(*cooldown) {
                    Some(deadline) => now > deadline,
                    None => false,
                },
            },
            ResetPolicy::Manual => false,
            ResetPolicy::Custom(strategy) => strategy.should_reset(last_failure, now),
        }
    }
}

impl Default for ResetPolicy {
    fn default() -> Self {
        ResetPolicy::Cooldown(DEFAULT_RESET_AFTER)
    }
}

impl fmt::Debug for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetPolicy::Cooldown(d) => f.debug_tuple("Cooldown").field(d).finish(),
            ResetPolicy::Manual => f.write_str("Manual"),
            ResetPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_policy() {
        let policy = TripPolicy::Threshold(3);
        assert!(!policy.should_trip(0));
        assert!(!policy.should_trip(2));
        assert!(policy.should_trip(3));
        assert!(policy.should_trip(7));
    }

    #[test]
    fn test_never_policy() {
        assert!(!TripPolicy::Never.should_trip(u32::MAX));
    }

    #[test]
    fn test_cooldown_is_strict() {
        let policy = ResetPolicy::Cooldown(Duration::from_millis(50));
        let failed_at = Instant::now();

        assert!(!policy.should_reset(Some(failed_at), failed_at));
        assert!(!policy.should_reset(Some(failed_at), failed_at + Duration::from_millis(50)));
        assert!(policy.should_reset(Some(failed_at), failed_at + Duration::from_millis(51)));
    }

    #[test]
    fn test_cooldown_without_failure() {
        let policy = ResetPolicy::Cooldown(Duration::from_secs(3600));
        assert!(policy.should_reset(None, Instant::now()));
    }

    #[test]
    fn test_manual_never_resets() {
        let now = Instant::now();
        assert!(!ResetPolicy::Manual.should_reset(None, now));
        assert!(!ResetPolicy::Manual.should_reset(Some(now), now + Duration::from_secs(60)));
    }

    struct Even;

    impl TripStrategy for Even {
        fn should_trip(&self, fail_count: u32) -> bool {
            fail_count > 0 && fail_count % 2 == 0
        }
    }

    #[test]
    fn test_custom_trip_strategy() {
        let policy = TripPolicy::custom(Even);
        assert!(!policy.should_trip(1));
        assert!(policy.should_trip(2));
        assert_eq!(format!("{:?}", policy), "Custom(..)");
    }

    #[test]
    fn test_defaults() {
        assert!(matches!(TripPolicy::default(), TripPolicy::Threshold(5)));
        assert!(matches!(
            ResetPolicy::default(),
            ResetPolicy::Cooldown(d) if d == Duration::from_millis(50)
        ));
    }
}
