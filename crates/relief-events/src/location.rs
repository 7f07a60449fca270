//! Location and Condition Types
//!
//! Monitored places and the sensed conditions at each of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monitored place. Identity is the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Returns true if both values name the same place.
    pub fn same_place(&self, other: &Location) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.4}, {:.4})",
            self.name, self.latitude, self.longitude
        )
    }
}

/// Sensed environmental state at a single location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionVector {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    /// km/h
    pub wind_speed: f64,
    /// AQI
    pub air_quality: f64,
    /// Richter
    pub seismic_activity: f64,
    /// Meters above normal
    pub water_level: f64,
    pub smoke_detected: bool,
}

impl fmt::Display for ConditionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temperature={:.1}°C, humidity={:.1}%, wind_speed={:.1} km/h, air_quality={:.1} AQI, \
             seismic_activity={:.1} Richter, water_level={:.2} m, smoke_detected={}",
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.air_quality,
            self.seismic_activity,
            self.water_level,
            self.smoke_detected
        )
    }
}
