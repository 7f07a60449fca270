//! Event Derivation
//!
//! Maps a batch of percepts to the ordered trigger events the response
//! controller reacts to. Order is the percept order, and within a percept:
//! temperature, water, then each active disaster in list order.

use relief_events::{DerivedEvent, DerivedEventType, Percept, ResourceKind, Severity};
use std::collections::HashSet;
use tracing::debug;

/// Temperature at or above which a TEMP_SPIKE fires (°C).
pub const TEMP_SPIKE_CELSIUS: f64 = 42.0;
/// Water level at or above which a WATER_RISE fires (m).
pub const WATER_RISE_METERS: f64 = 1.5;
/// Severity at or above which a SEVERITY_ESCALATION fires.
pub const SEVERITY_ESCALATION_LEVEL: Severity = Severity::Critical;
/// Rescue-team need at or above which a RESOURCE_SHORTAGE fires.
pub const RESOURCE_SHORTAGE_RESCUE_TEAMS: u32 = 12;

/// Disaster ids already reported as DISASTER_DETECTED.
///
/// Insert-only for the lifetime of a controller.
#[derive(Debug, Clone, Default)]
pub struct SeenEvents {
    ids: HashSet<String>,
}

impl SeenEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.ids.contains(event_id)
    }

    /// Records an id. Returns true if it was not seen before.
    pub fn insert(&mut self, event_id: &str) -> bool {
        if self.ids.contains(event_id) {
            return false;
        }
        self.ids.insert(event_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Derives trigger events from `percepts`, recording newly detected
/// disasters in `seen`.
pub fn derive_events(percepts: &[Percept], seen: &mut SeenEvents) -> Vec<DerivedEvent> {
    let mut events = Vec::new();

    for percept in percepts {
        let location = percept.location.name.as_str();

        if percept.temperature() >= TEMP_SPIKE_CELSIUS {
            events.push(DerivedEvent::condition(
                DerivedEventType::TempSpike,
                location,
                format!("Temperature at {:.1}°C", percept.temperature()),
            ));
        }

        if percept.water_level() >= WATER_RISE_METERS {
            events.push(DerivedEvent::condition(
                DerivedEventType::WaterRise,
                location,
                format!("Water level at {:.2}m", percept.water_level()),
            ));
        }

        for disaster in &percept.active_disasters {
            if seen.insert(&disaster.event_id) {
                events.push(DerivedEvent::for_disaster(
                    DerivedEventType::DisasterDetected,
                    disaster,
                    format!("{} ({})", disaster.disaster_type, disaster.severity),
                ));
            }

            if disaster.severity >= SEVERITY_ESCALATION_LEVEL {
                events.push(DerivedEvent::for_disaster(
                    DerivedEventType::SeverityEscalation,
                    disaster,
                    format!("Severity is {}", disaster.severity),
                ));
            }

            if disaster.needed(ResourceKind::RescueTeams) >= RESOURCE_SHORTAGE_RESCUE_TEAMS {
                events.push(DerivedEvent::for_disaster(
                    DerivedEventType::ResourceShortage,
                    disaster,
                    "High rescue-team requirement",
                ));
            }
        }
    }

    debug!(percepts = percepts.len(), events = events.len(), "derived events");
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_events::fixtures;
    use relief_events::{DisasterType, Severity};

    fn types(events: &[DerivedEvent]) -> Vec<DerivedEventType> {
        events.iter().map(|e| e.event_type).collect()
    }

    #[test]
    fn test_calm_percept_derives_nothing() {
        let mut seen = SeenEvents::new();
        let percepts = vec![fixtures::percept(fixtures::calm_conditions(), vec![])];
        assert!(derive_events(&percepts, &mut seen).is_empty());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let mut conditions = fixtures::calm_conditions();
        conditions.temperature = TEMP_SPIKE_CELSIUS;
        conditions.water_level = WATER_RISE_METERS;

        let mut seen = SeenEvents::new();
        let events = derive_events(&[fixtures::percept(conditions, vec![])], &mut seen);
        assert_eq!(
            types(&events),
            vec![DerivedEventType::TempSpike, DerivedEventType::WaterRise]
        );
        assert_eq!(events[0].details, "Temperature at 42.0°C");
        assert_eq!(events[1].details, "Water level at 1.50m");
        assert!(events[0].disaster.is_none());
    }

    #[test]
    fn test_disaster_events_in_order() {
        let mut quake = fixtures::disaster("EVT0001", DisasterType::Earthquake, Severity::Severe);
        quake.resources_needed.insert(ResourceKind::RescueTeams, 12);

        let mut seen = SeenEvents::new();
        let events = derive_events(
            &[fixtures::percept(fixtures::calm_conditions(), vec![quake])],
            &mut seen,
        );

        assert_eq!(
            types(&events),
            vec![
                DerivedEventType::DisasterDetected,
                DerivedEventType::SeverityEscalation,
                DerivedEventType::ResourceShortage,
            ]
        );
        assert_eq!(events[0].details, "earthquake (SEVERE)");
        assert_eq!(events[1].details, "Severity is SEVERE");
        assert_eq!(events[2].details, "High rescue-team requirement");
        assert!(events.iter().all(|e| e.location == "Accra"));
        assert!(events
            .iter()
            .all(|e| e.disaster.as_ref().map(|d| d.event_id.as_str()) == Some("EVT0001")));
    }

    #[test]
    fn test_detection_fires_once_per_id() {
        let flood = fixtures::disaster("EVT0003", DisasterType::Flood, Severity::Critical);
        let percepts = vec![fixtures::percept(fixtures::calm_conditions(), vec![flood])];
        let mut seen = SeenEvents::new();

        let first = derive_events(&percepts, &mut seen);
        let second = derive_events(&percepts, &mut seen);

        assert_eq!(
            types(&first),
            vec![
                DerivedEventType::DisasterDetected,
                DerivedEventType::SeverityEscalation
            ]
        );
        // Escalation repeats every cycle the disaster stays active.
        assert_eq!(types(&second), vec![DerivedEventType::SeverityEscalation]);
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("EVT0003"));
    }

    #[test]
    fn test_percept_order_is_preserved() {
        let mut hot = fixtures::calm_conditions();
        hot.temperature = 44.0;
        let mut wet = fixtures::calm_conditions();
        wet.water_level = 3.0;

        let percepts = vec![
            fixtures::percept_at(fixtures::second_location(), wet, vec![]),
            fixtures::percept(hot, vec![]),
        ];
        let events = derive_events(&percepts, &mut SeenEvents::new());

        assert_eq!(events[0].event_type, DerivedEventType::WaterRise);
        assert_eq!(events[0].location, "Kumasi");
        assert_eq!(events[1].event_type, DerivedEventType::TempSpike);
        assert_eq!(events[1].location, "Accra");
    }

    #[test]
    fn test_below_critical_does_not_escalate() {
        let fire = fixtures::disaster("EVT0004", DisasterType::Fire, Severity::High);
        let events = derive_events(
            &[fixtures::percept(fixtures::calm_conditions(), vec![fire])],
            &mut SeenEvents::new(),
        );
        assert_eq!(types(&events), vec![DerivedEventType::DisasterDetected]);
    }
}
