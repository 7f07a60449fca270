//! Environment Engine
//!
//! Owns the monitored locations, their condition vectors and the set of
//! active disasters. Each call to [`EnvironmentEngine::advance`] is one
//! simulation cycle:
//!
//! 1. Drift every location's weather and clamp it to realistic bounds
//! 2. Maybe spawn one disaster and apply its onset deltas
//! 3. For every active disaster, maybe mark it resolved, and apply relief
//! 4. Drop resolved disasters and re-clamp
//!
//! All randomness comes from the injected RNG, in a fixed draw order, so a
//! seed plus a call sequence fully determines the run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use relief_events::{
    ConditionVector, DisasterEvent, DisasterType, Location, Percept, ResourceKind, ResourceMap,
    Severity, SimTimestamp,
};
use std::collections::HashMap;
use tracing::{debug, info};

use super::deltas::{self, Phase};
use crate::error::EnvironmentError;

/// Realistic range for temperature (°C).
pub const TEMPERATURE_BOUNDS: (f64, f64) = (20.0, 45.0);
/// Realistic range for relative humidity (%).
pub const HUMIDITY_BOUNDS: (f64, f64) = (30.0, 100.0);
/// Realistic range for the air quality index.
pub const AIR_QUALITY_BOUNDS: (f64, f64) = (0.0, 500.0);

/// Upper bound of each spawned disaster's need, per kind.
const RESOURCE_NEED_MAX: [(ResourceKind, u32); 5] = [
    (ResourceKind::MedicalKits, 50),
    (ResourceKind::FoodSupplies, 100),
    (ResourceKind::Water, 200),
    (ResourceKind::ShelterMaterials, 50),
    (ResourceKind::RescueTeams, 20),
];

/// Probabilities that drive disaster churn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentParams {
    /// Chance that a cycle spawns one new disaster
    pub spawn_probability: f64,
    /// Chance, per active disaster per cycle, that it resolves
    pub resolve_probability: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            spawn_probability: 0.80,
            resolve_probability: 0.30,
        }
    }
}

impl EnvironmentParams {
    pub fn validate(&self) -> Result<(), EnvironmentError> {
        for (name, value) in [
            ("spawn_probability", self.spawn_probability),
            ("resolve_probability", self.resolve_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EnvironmentError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}

/// Stochastic disaster environment.
#[derive(Debug)]
pub struct EnvironmentEngine<R = SmallRng> {
    rng: R,
    params: EnvironmentParams,
    locations: Vec<Location>,
    /// Parallel to `locations`
    conditions: Vec<ConditionVector>,
    location_index: HashMap<String, usize>,
    active: Vec<DisasterEvent>,
    event_counter: u32,
    clock: SimTimestamp,
}

impl EnvironmentEngine<SmallRng> {
    /// Creates an engine driven by a `SmallRng` seeded from `seed`.
    pub fn seeded(
        seed: u64,
        locations: Vec<Location>,
        params: EnvironmentParams,
    ) -> Result<Self, EnvironmentError> {
        Self::with_rng(SmallRng::seed_from_u64(seed), locations, params)
    }
}

impl<R: Rng> EnvironmentEngine<R> {
    /// Creates an engine around any random source.
    ///
    /// Initial conditions are drawn from `rng` in location order.
    pub fn with_rng(
        mut rng: R,
        locations: Vec<Location>,
        params: EnvironmentParams,
    ) -> Result<Self, EnvironmentError> {
        params.validate()?;
        if locations.is_empty() {
            return Err(EnvironmentError::NoLocations);
        }

        let mut location_index = HashMap::with_capacity(locations.len());
        for (i, location) in locations.iter().enumerate() {
            if location_index.insert(location.name.clone(), i).is_some() {
                return Err(EnvironmentError::DuplicateLocation(location.name.clone()));
            }
        }

        let conditions = locations
            .iter()
            .map(|_| initial_conditions(&mut rng))
            .collect();

        info!(locations = locations.len(), "environment initialized");

        Ok(Self {
            rng,
            params,
            locations,
            conditions,
            location_index,
            active: Vec::new(),
            event_counter: 0,
            clock: SimTimestamp::start(),
        })
    }

    /// Runs one simulation cycle.
    pub fn advance(&mut self) {
        self.clock.advance();

        for conditions in self.conditions.iter_mut() {
            drift(conditions, &mut self.rng);
            clamp_to_realistic_bounds(conditions);
        }

        if self.rng.gen::<f64>() < self.params.spawn_probability {
            self.spawn_disaster();
        }

        self.relieve_disasters();

        // Onset deltas can push past the realistic range; pull back in.
        for conditions in self.conditions.iter_mut() {
            clamp_to_realistic_bounds(conditions);
        }
    }

    /// Senses one monitored location.
    pub fn sense(&self, location_name: &str) -> Result<Percept, EnvironmentError> {
        let index = *self
            .location_index
            .get(location_name)
            .ok_or_else(|| EnvironmentError::NotFound(location_name.to_string()))?;
        Ok(self.percept_at(index))
    }

    /// Senses every monitored location, in initialization order.
    pub fn sense_all(&self) -> Vec<Percept> {
        (0..self.locations.len()).map(|i| self.percept_at(i)).collect()
    }

    /// Human-readable status banner. Display only.
    pub fn summary(&self) -> String {
        let rule = "=".repeat(70);
        let thin = "-".repeat(70);
        let mut summary = format!("\n{}\nENVIRONMENT STATUS SUMMARY\n{}\n", rule, rule);
        summary.push_str(&format!("Active Disasters: {}\n", self.active.len()));
        summary.push_str(&format!("Monitored Locations: {}\n", self.locations.len()));
        summary.push_str(&format!("Timestamp: {}\n", self.clock));
        summary.push_str(&format!("{}\n\n", rule));

        if self.active.is_empty() {
            summary.push_str("No active disasters - All locations clear\n");
        } else {
            summary.push_str(&format!("ACTIVE DISASTERS:\n{}\n", thin));
            for disaster in &self.active {
                summary.push_str(&format!("{}\n", disaster));
                summary.push_str(&format!(
                    "  Casualties: {}, Damage: {:.1}%, Area: {:.1} km²\n",
                    disaster.casualties, disaster.infrastructure_damage, disaster.affected_area
                ));
            }
        }
        summary.push_str(&format!("{}\n", thin));
        summary
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn active_disasters(&self) -> &[DisasterEvent] {
        &self.active
    }

    pub fn clock(&self) -> SimTimestamp {
        self.clock
    }

    /// Number of disasters spawned so far.
    pub fn spawned_count(&self) -> u32 {
        self.event_counter
    }

    pub fn params(&self) -> EnvironmentParams {
        self.params
    }

    fn percept_at(&self, index: usize) -> Percept {
        let location = &self.locations[index];
        let local = self
            .active
            .iter()
            .filter(|d| d.is_at(&location.name))
            .cloned()
            .collect();
        Percept::new(
            self.clock,
            location.clone(),
            self.conditions[index].clone(),
            local,
        )
    }

    fn spawn_disaster(&mut self) {
        self.event_counter += 1;

        let types = DisasterType::all();
        let disaster_type = types[self.rng.gen_range(0..types.len())];
        let index = self.rng.gen_range(0..self.locations.len());
        let severities = Severity::all();
        let severity = severities[self.rng.gen_range(0..severities.len())];

        deltas::apply(
            &mut self.conditions[index],
            deltas::spec_for(disaster_type),
            Phase::Onset,
            &mut self.rng,
        );

        let affected_area = self.rng.gen_range(10.0..=1000.0);
        let casualties = self.rng.gen_range(0..=100);
        let infrastructure_damage = self.rng.gen_range(0.0..=100.0);
        let mut resources = ResourceMap::new();
        for (kind, max) in RESOURCE_NEED_MAX {
            resources.insert(kind, self.rng.gen_range(0..=max));
        }

        let disaster = DisasterEvent::new(
            DisasterEvent::format_id(self.event_counter),
            disaster_type,
            self.locations[index].clone(),
            severity,
            self.clock,
        )
        .with_affected_area(affected_area)
        .with_casualties(casualties)
        .with_infrastructure_damage(infrastructure_damage)
        .with_resources(resources);

        info!(
            event_id = %disaster.event_id,
            disaster_type = %disaster_type,
            location = %disaster.location.name,
            severity = %severity,
            "disaster spawned"
        );
        self.active.push(disaster);
    }

    fn relieve_disasters(&mut self) {
        let mut resolved = Vec::with_capacity(self.active.len());

        for disaster in &self.active {
            let resolves = self.rng.gen::<f64>() < self.params.resolve_probability;
            resolved.push(resolves);

            let Some(&index) = self.location_index.get(&disaster.location.name) else {
                continue;
            };
            let spec = deltas::spec_for(disaster.disaster_type);
            let conditions = &mut self.conditions[index];
            deltas::apply(conditions, spec, Phase::Relief, &mut self.rng);
            if resolves && spec.sets_smoke {
                conditions.smoke_detected = false;
            }
        }

        let mut marks = resolved.into_iter();
        self.active.retain(|disaster| {
            let resolves = marks.next().unwrap_or(false);
            if resolves {
                debug!(event_id = %disaster.event_id, "disaster resolved");
            }
            !resolves
        });
    }
}

fn initial_conditions<R: Rng>(rng: &mut R) -> ConditionVector {
    ConditionVector {
        temperature: rng.gen_range(25.0..=35.0),
        humidity: rng.gen_range(60.0..=90.0),
        wind_speed: rng.gen_range(0.0..=30.0),
        air_quality: rng.gen_range(50.0..=150.0),
        seismic_activity: 0.0,
        water_level: 0.0,
        smoke_detected: false,
    }
}

fn drift<R: Rng>(conditions: &mut ConditionVector, rng: &mut R) {
    conditions.temperature += rng.gen_range(-2.0..=2.0);
    conditions.humidity += rng.gen_range(-5.0..=5.0);
    conditions.wind_speed = (conditions.wind_speed + rng.gen_range(-5.0..=5.0)).max(0.0);
    conditions.air_quality += rng.gen_range(-10.0..=10.0);
}

fn clamp_to_realistic_bounds(conditions: &mut ConditionVector) {
    conditions.temperature = conditions
        .temperature
        .clamp(TEMPERATURE_BOUNDS.0, TEMPERATURE_BOUNDS.1);
    conditions.humidity = conditions.humidity.clamp(HUMIDITY_BOUNDS.0, HUMIDITY_BOUNDS.1);
    conditions.air_quality = conditions
        .air_quality
        .clamp(AIR_QUALITY_BOUNDS.0, AIR_QUALITY_BOUNDS.1);
}
