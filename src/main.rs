//! breaker-sim
//!
//! Drives a circuit breaker against a simulated flaky dependency and reports
//! what happened.
//!
//! ```text
//!   ticker ──▶ Breaker::protect_async ──▶ FlakyDependency
//!                   │
//!                   └── StateSink ──▶ "State change observed" log lines
//! ```

use std::path::PathBuf;

use clap::Parser;

use breaker::config::{load_config, validate_config, AppConfig, ConfigError};
use breaker::lifecycle::signals;
use breaker::observability::{logging, metrics};
use breaker::simulation;
use breaker::Breaker;

#[derive(Parser)]
#[command(name = "breaker-sim")]
#[command(about = "Run a circuit breaker against a simulated flaky dependency", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of calls to attempt.
    #[arg(long)]
    calls: Option<u64>,

    /// Probability that a call fails outside the outage window.
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Failures before the breaker trips.
    #[arg(long)]
    trip_after: Option<u32>,

    /// Cooldown before a trial call, in milliseconds.
    #[arg(long)]
    reset_after_ms: Option<u64>,

    /// Print the final report as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(calls) = self.calls {
            config.simulation.calls = calls;
        }
        if let Some(rate) = self.failure_rate {
            config.simulation.failure_rate = rate;
        }
        if let Some(n) = self.trip_after {
            config.breaker.trip_after = n;
        }
        if let Some(ms) = self.reset_after_ms {
            config.breaker.reset_after_ms = ms;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(
        &config.observability.log_level.to_ascii_lowercase(),
        config.observability.log_format,
    )?;

    tracing::info!(
        breaker = %config.breaker.name,
        trip_after = config.breaker.trip_after,
        reset_after_ms = config.breaker.reset_after_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let breaker = Breaker::with_config(&config.breaker);
    let report = simulation::run(&breaker, &config.simulation, signals::interrupted()).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            rejected = report.rejected,
            transitions = report.observed.len(),
            final_state = %report.breaker.state,
            "Simulation complete"
        );
    }

    Ok(())
}
