//! Percepts
//!
//! A percept is an immutable snapshot of one location: its conditions at
//! sensing time plus the disasters active there.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::disaster::DisasterEvent;
use crate::location::{ConditionVector, Location};
use crate::timestamp::SimTimestamp;

/// What a sensor reports about one location at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percept {
    pub timestamp: SimTimestamp,
    pub location: Location,
    pub conditions: ConditionVector,
    pub active_disasters: Vec<DisasterEvent>,
}

impl Percept {
    pub fn new(
        timestamp: SimTimestamp,
        location: Location,
        conditions: ConditionVector,
        active_disasters: Vec<DisasterEvent>,
    ) -> Self {
        Self {
            timestamp,
            location,
            conditions,
            active_disasters,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.conditions.temperature
    }

    pub fn water_level(&self) -> f64 {
        self.conditions.water_level
    }

    /// Returns true if any disaster is active at this location.
    pub fn has_disasters(&self) -> bool {
        !self.active_disasters.is_empty()
    }

    /// The first active disaster, in spawn order.
    pub fn first_disaster(&self) -> Option<&DisasterEvent> {
        self.active_disasters.first()
    }
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disasters: Vec<String> = self.active_disasters.iter().map(|d| d.to_string()).collect();
        write!(
            f,
            "EnvironmentPercept(timestamp={}, location={}, {}, active_disasters=[{}])",
            self.timestamp,
            self.location,
            self.conditions,
            disasters.join(", ")
        )
    }
}
