//! Simulation Timestamp Types
//!
//! Simulation time is the cycle counter. Wall-clock time never enters the
//! simulated state, so two runs with the same seed render identically.
//!
//! # Example
//!
//! ```
//! use relief_events::SimTimestamp;
//!
//! let ts = SimTimestamp::new(7);
//! assert_eq!(ts.cycle, 7);
//! assert_eq!(ts.to_string(), "cycle_0007");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A point in simulation time, measured in completed cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTimestamp {
    /// Monotonically increasing cycle counter.
    pub cycle: u64,
}

impl SimTimestamp {
    /// Creates a new SimTimestamp.
    pub fn new(cycle: u64) -> Self {
        Self { cycle }
    }

    /// Creates a timestamp for the start of the simulation.
    pub fn start() -> Self {
        Self { cycle: 0 }
    }

    /// Increments the cycle counter by one.
    pub fn advance(&mut self) {
        self.cycle += 1;
    }

    /// Returns the timestamp one cycle later.
    pub fn next(self) -> Self {
        Self {
            cycle: self.cycle + 1,
        }
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle_{:04}", self.cycle)
    }
}

/// Error type for parsing SimTimestamp from strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTimestampError {
    InvalidFormat(String),
    InvalidCycle(String),
}

impl fmt::Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTimestampError::InvalidFormat(s) => {
                write!(f, "invalid timestamp format: '{}', expected 'cycle_N'", s)
            }
            ParseTimestampError::InvalidCycle(s) => write!(f, "invalid cycle: '{}'", s),
        }
    }
}

impl std::error::Error for ParseTimestampError {}

impl FromStr for SimTimestamp {
    type Err = ParseTimestampError;

    /// Parses a SimTimestamp from a string like "cycle_0012".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("cycle_")
            .ok_or_else(|| ParseTimestampError::InvalidFormat(s.to_string()))?;
        let cycle = digits
            .parse::<u64>()
            .map_err(|_| ParseTimestampError::InvalidCycle(digits.to_string()))?;
        Ok(SimTimestamp { cycle })
    }
}

// Serialized as the display string so trace records stay human-readable
impl Serialize for SimTimestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
