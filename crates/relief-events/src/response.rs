//! Response Types
//!
//! Derived trigger events, controller states and transition records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::disaster::DisasterEvent;
use crate::timestamp::SimTimestamp;

/// Trigger categories computed from percepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedEventType {
    TempSpike,
    WaterRise,
    DisasterDetected,
    SeverityEscalation,
    ResourceShortage,
}

impl DerivedEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedEventType::TempSpike => "TEMP_SPIKE",
            DerivedEventType::WaterRise => "WATER_RISE",
            DerivedEventType::DisasterDetected => "DISASTER_DETECTED",
            DerivedEventType::SeverityEscalation => "SEVERITY_ESCALATION",
            DerivedEventType::ResourceShortage => "RESOURCE_SHORTAGE",
        }
    }
}

impl fmt::Display for DerivedEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trigger the response controller must react to.
///
/// Produced and consumed within one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedEvent {
    pub event_type: DerivedEventType,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disaster: Option<DisasterEvent>,
    pub details: String,
}

impl DerivedEvent {
    /// Creates a condition trigger with no disaster attached.
    pub fn condition(
        event_type: DerivedEventType,
        location: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            location: location.into(),
            disaster: None,
            details: details.into(),
        }
    }

    /// Creates a trigger about a specific disaster.
    pub fn for_disaster(
        event_type: DerivedEventType,
        disaster: &DisasterEvent,
        details: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            location: disaster.location.name.clone(),
            disaster: Some(disaster.clone()),
            details: details.into(),
        }
    }
}

impl fmt::Display for DerivedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EVENT {} @ {} | {}", self.event_type, self.location, self.details)
    }
}

/// Finite states of the response controller. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseState {
    #[default]
    Monitoring,
    Assessing,
    Dispatching,
    Recovery,
}

impl ResponseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseState::Monitoring => "MONITORING",
            ResponseState::Assessing => "ASSESSING",
            ResponseState::Dispatching => "DISPATCHING",
            ResponseState::Recovery => "RECOVERY",
        }
    }
}

impl fmt::Display for ResponseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One real state change of the controller (never `from == to`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: ResponseState,
    pub to: ResponseState,
    pub reason: String,
    pub timestamp: SimTimestamp,
}

impl fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {} | {}",
            self.timestamp, self.from, self.to, self.reason
        )
    }
}
