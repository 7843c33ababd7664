//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker transitions and call outcomes:
//!     → tracing events (breaker = name field)
//!     → metrics.rs (counters, state gauge)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
