//! Breaker states and point-in-time snapshots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The state of a circuit breaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Calls pass through to the protected operation.
    #[default]
    Closed,
    /// Calls are rejected without invoking the protected operation.
    Open,
    /// A single trial call is testing whether the dependency recovered.
    Partial,
}

impl State {
    /// Lowercase name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::Open => "open",
            State::Partial => "partial",
        }
    }

    /// Numeric encoding exported through the `breaker_state` gauge.
    pub fn gauge_value(&self) -> f64 {
        match self {
            State::Closed => 0.0,
            State::Partial => 1.0,
            State::Open => 2.0,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown breaker state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" => Ok(State::Closed),
            "open" => Ok(State::Open),
            "partial" => Ok(State::Partial),
            _ => Err(UnknownState(s.to_string())),
        }
    }
}

/// A consistent view of a breaker taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub state: State,
    pub fail_count: u32,
    pub success_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(State::Closed.to_string(), "closed");
        assert_eq!(State::Open.to_string(), "open");
        assert_eq!(State::Partial.to_string(), "partial");
    }

    #[test]
    fn test_state_parse() {
        assert_eq!("closed".parse::<State>(), Ok(State::Closed));
        assert_eq!(" OPEN ".parse::<State>(), Ok(State::Open));
        assert_eq!("Partial".parse::<State>(), Ok(State::Partial));
        assert_eq!(
            "half-open".parse::<State>(),
            Err(UnknownState("half-open".to_string()))
        );
    }

    #[test]
    fn test_snapshot_serializes_lowercase_state() {
        let snapshot = Snapshot {
            name: "db".into(),
            state: State::Partial,
            fail_count: 0,
            success_count: 0,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "partial");
        assert_eq!(json["name"], "db");
    }
}
