//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → BreakerConfig handed to Breaker::with_config
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; a breaker is never reconfigured in place
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, BreakerConfig, LogFormat, ObservabilityConfig, SimulationConfig};
pub use validation::{validate_config, ValidationError};
