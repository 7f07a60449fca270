//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // relief-events = { path = "../relief-events", features = ["test-fixtures"] }
//!
//! use relief_events::fixtures;
//!
//! let flood = fixtures::disaster("EVT0001", DisasterType::Flood, Severity::High);
//! let percept = fixtures::percept(fixtures::calm_conditions(), vec![flood]);
//! ```

use crate::{
    ConditionVector, DisasterEvent, DisasterType, Location, Percept, ResourceKind, Severity,
    SimTimestamp,
};

/// The location every fixture disaster and percept uses.
pub fn sample_location() -> Location {
    Location::new("Accra", 34.0522, -118.2437)
}

/// A second location for multi-location tests.
pub fn second_location() -> Location {
    Location::new("Kumasi", 40.7128, -74.0060)
}

/// Conditions that trigger nothing.
pub fn calm_conditions() -> ConditionVector {
    ConditionVector {
        temperature: 30.0,
        humidity: 70.0,
        wind_speed: 10.0,
        air_quality: 80.0,
        seismic_activity: 0.0,
        water_level: 0.0,
        smoke_detected: false,
    }
}

/// A disaster at [`sample_location`] with modest impact and needs below
/// every shortage threshold.
pub fn disaster(event_id: &str, disaster_type: DisasterType, severity: Severity) -> DisasterEvent {
    DisasterEvent::new(
        event_id,
        disaster_type,
        sample_location(),
        severity,
        SimTimestamp::new(1),
    )
    .with_affected_area(250.0)
    .with_casualties(10)
    .with_infrastructure_damage(20.0)
    .with_resource(ResourceKind::MedicalKits, 5)
    .with_resource(ResourceKind::FoodSupplies, 20)
    .with_resource(ResourceKind::Water, 50)
    .with_resource(ResourceKind::ShelterMaterials, 8)
    .with_resource(ResourceKind::RescueTeams, 4)
}

/// A percept at [`sample_location`] taken at cycle 1.
pub fn percept(conditions: ConditionVector, disasters: Vec<DisasterEvent>) -> Percept {
    Percept::new(SimTimestamp::new(1), sample_location(), conditions, disasters)
}

/// A percept at an arbitrary location taken at cycle 1.
pub fn percept_at(
    location: Location,
    conditions: ConditionVector,
    disasters: Vec<DisasterEvent>,
) -> Percept {
    Percept::new(SimTimestamp::new(1), location, conditions, disasters)
}
