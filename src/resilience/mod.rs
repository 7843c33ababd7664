//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a dependency:
//!     → circuit_breaker.rs (admit: closed passes, open rejects or starts a trial)
//!     → caller's operation runs, lock released
//!     → circuit_breaker.rs (record outcome, consult policy.rs, maybe transition)
//!     → subscription.rs (push latest state to every sink)
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency; composing breakers is the caller's job
//! - The breaker never retries and never times out the operation
//! - Rejections and operation failures are distinct error variants

pub mod circuit_breaker;
pub mod error;
pub mod policy;
pub mod state;
pub mod subscription;

pub use circuit_breaker::Breaker;
pub use error::BreakerError;
pub use policy::{ResetPolicy, ResetStrategy, TripPolicy, TripStrategy};
pub use state::{Snapshot, State, UnknownState};
pub use subscription::StateSink;
