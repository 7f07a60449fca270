//! Disaster Types
//!
//! Disaster categories, severity levels, resource kinds and the disaster
//! event record produced by the environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::location::Location;
use crate::timestamp::SimTimestamp;

/// Kinds of hazard the environment can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterType {
    Flood,
    Earthquake,
    Fire,
    Drought,
    Storm,
    Hurricane,
}

impl DisasterType {
    /// Returns all disaster type variants, in draw order.
    pub fn all() -> &'static [DisasterType] {
        &[
            DisasterType::Flood,
            DisasterType::Earthquake,
            DisasterType::Fire,
            DisasterType::Drought,
            DisasterType::Storm,
            DisasterType::Hurricane,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisasterType::Flood => "flood",
            DisasterType::Earthquake => "earthquake",
            DisasterType::Fire => "fire",
            DisasterType::Drought => "drought",
            DisasterType::Storm => "storm",
            DisasterType::Hurricane => "hurricane",
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal severity, LOW (1) through SEVERE (5).
///
/// The derived ordering follows the ordinal and is used both for escalation
/// thresholds and for prioritization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low = 1,
    Moderate = 2,
    High = 3,
    Critical = 4,
    Severe = 5,
}

impl Severity {
    /// Returns all severity variants, in draw order.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Low,
            Severity::Moderate,
            Severity::High,
            Severity::Critical,
            Severity::Severe,
        ]
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
            Severity::Severe => "SEVERE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Countable relief resources.
///
/// The first five are what a disaster can need; `FireTrucks` and
/// `Ambulances` only exist in the coordinator's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    MedicalKits,
    FoodSupplies,
    Water,
    ShelterMaterials,
    RescueTeams,
    FireTrucks,
    Ambulances,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::MedicalKits,
            ResourceKind::FoodSupplies,
            ResourceKind::Water,
            ResourceKind::ShelterMaterials,
            ResourceKind::RescueTeams,
            ResourceKind::FireTrucks,
            ResourceKind::Ambulances,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::MedicalKits => "medical_kits",
            ResourceKind::FoodSupplies => "food_supplies",
            ResourceKind::Water => "water",
            ResourceKind::ShelterMaterials => "shelter_materials",
            ResourceKind::RescueTeams => "rescue_teams",
            ResourceKind::FireTrucks => "fire_trucks",
            ResourceKind::Ambulances => "ambulances",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a resource kind name is not recognized.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resource kind: '{}'", self.0)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for ResourceKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// Resource quantities keyed by kind. Ordered so renderings are stable.
pub type ResourceMap = BTreeMap<ResourceKind, u32>;

/// Renders a resource map as `{kind: n, kind: n}`.
pub fn format_resources(resources: &ResourceMap) -> String {
    let body: Vec<String> = resources
        .iter()
        .map(|(kind, amount)| format!("{}: {}", kind, amount))
        .collect();
    format!("{{{}}}", body.join(", "))
}

/// A hazard active at one location.
///
/// Immutable once created; its lifetime ends when the environment resolves
/// it and drops it from the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterEvent {
    /// `EVT0001`, `EVT0002`, ...
    pub event_id: String,
    pub disaster_type: DisasterType,
    pub location: Location,
    pub severity: Severity,
    pub timestamp: SimTimestamp,
    /// Square kilometers
    pub affected_area: f64,
    pub casualties: u32,
    /// Percent, 0-100
    pub infrastructure_damage: f64,
    pub resources_needed: ResourceMap,
}

impl DisasterEvent {
    /// Creates a disaster with no recorded impact; use the `with_*`
    /// builders to fill in casualties, damage and needs.
    pub fn new(
        event_id: impl Into<String>,
        disaster_type: DisasterType,
        location: Location,
        severity: Severity,
        timestamp: SimTimestamp,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            disaster_type,
            location,
            severity,
            timestamp,
            affected_area: 0.0,
            casualties: 0,
            infrastructure_damage: 0.0,
            resources_needed: ResourceMap::new(),
        }
    }

    /// Formats the sequential id used for spawned disasters.
    pub fn format_id(counter: u32) -> String {
        format!("EVT{:04}", counter)
    }

    pub fn with_affected_area(mut self, area: f64) -> Self {
        self.affected_area = area;
        self
    }

    pub fn with_casualties(mut self, casualties: u32) -> Self {
        self.casualties = casualties;
        self
    }

    pub fn with_infrastructure_damage(mut self, damage: f64) -> Self {
        self.infrastructure_damage = damage;
        self
    }

    pub fn with_resource(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.resources_needed.insert(kind, amount);
        self
    }

    pub fn with_resources(mut self, resources: ResourceMap) -> Self {
        self.resources_needed = resources;
        self
    }

    /// Quantity needed of `kind`, zero when absent.
    pub fn needed(&self, kind: ResourceKind) -> u32 {
        self.resources_needed.get(&kind).copied().unwrap_or(0)
    }

    /// Returns true if this disaster is at the named location.
    pub fn is_at(&self, location_name: &str) -> bool {
        self.location.name == location_name
    }
}

impl fmt::Display for DisasterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DisasterEvent(id={}, type={}, location={}, severity={}, timestamp={}, \
             affected_area={:.1} sq km, casualties={}, infrastructure_damage={:.1}%, \
             resources_needed={})",
            self.event_id,
            self.disaster_type,
            self.location,
            self.severity,
            self.timestamp,
            self.affected_area,
            self.casualties,
            self.infrastructure_damage,
            format_resources(&self.resources_needed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_follows_ordinal() {
        assert!(Severity::Low < Severity::Moderate);
        assert!(Severity::Critical < Severity::Severe);
        assert_eq!(Severity::Critical.ordinal(), 4);
        let ordinals: Vec<u8> = Severity::all().iter().map(|s| s.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_severity_serializes_as_name() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
    }

    #[test]
    fn test_disaster_type_serializes_lowercase() {
        let json = serde_json::to_string(&DisasterType::Hurricane).unwrap();
        assert_eq!(json, "\"hurricane\"");
        assert_eq!(DisasterType::all().len(), 6);
    }

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!("rescue_teams".parse::<ResourceKind>().unwrap(), ResourceKind::RescueTeams);
        assert_eq!("fire_trucks".parse::<ResourceKind>().unwrap(), ResourceKind::FireTrucks);
        assert!("helicopters".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_resource_map_json_keys() {
        let mut map = ResourceMap::new();
        map.insert(ResourceKind::RescueTeams, 3);
        map.insert(ResourceKind::MedicalKits, 10);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"medical_kits":10,"rescue_teams":3}"#);

        let parsed: ResourceMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_format_resources() {
        let mut map = ResourceMap::new();
        assert_eq!(format_resources(&map), "{}");
        map.insert(ResourceKind::RescueTeams, 2);
        map.insert(ResourceKind::Water, 40);
        assert_eq!(format_resources(&map), "{water: 40, rescue_teams: 2}");
    }

    #[test]
    fn test_event_id_format() {
        assert_eq!(DisasterEvent::format_id(1), "EVT0001");
        assert_eq!(DisasterEvent::format_id(123), "EVT0123");
    }

    #[test]
    fn test_needed_defaults_to_zero() {
        let disaster = DisasterEvent::new(
            "EVT0001",
            DisasterType::Fire,
            Location::new("Ada", 41.8781, -87.6298),
            Severity::High,
            SimTimestamp::new(1),
        )
        .with_resource(ResourceKind::RescueTeams, 14);

        assert_eq!(disaster.needed(ResourceKind::RescueTeams), 14);
        assert_eq!(disaster.needed(ResourceKind::Water), 0);
        assert!(disaster.is_at("Ada"));
    }

    #[test]
    fn test_disaster_display() {
        let disaster = DisasterEvent::new(
            "EVT0002",
            DisasterType::Flood,
            Location::new("Accra", 34.0522, -118.2437),
            Severity::Moderate,
            SimTimestamp::new(2),
        )
        .with_casualties(4)
        .with_infrastructure_damage(12.3)
        .with_affected_area(300.0)
        .with_resource(ResourceKind::Water, 80);

        assert_eq!(
            disaster.to_string(),
            "DisasterEvent(id=EVT0002, type=flood, location=Accra (34.0522, -118.2437), \
             severity=MODERATE, timestamp=cycle_0002, affected_area=300.0 sq km, casualties=4, \
             infrastructure_damage=12.3%, resources_needed={water: 80})"
        );
    }
}
