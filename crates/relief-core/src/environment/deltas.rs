//! Disaster Delta Table
//!
//! One static table describes how each disaster type pushes the conditions
//! at its location. The onset path (spawn) and the relief path (every cycle
//! the disaster stays active) both read the same rows, so relief is always
//! the exact mirror of onset: same fields, same ranges, opposite direction.

use rand::Rng;
use relief_events::{ConditionVector, DisasterType};

/// A numeric field of [`ConditionVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    Humidity,
    WindSpeed,
    AirQuality,
    SeismicActivity,
    WaterLevel,
}

impl Field {
    fn slot(self, conditions: &mut ConditionVector) -> &mut f64 {
        match self {
            Field::Temperature => &mut conditions.temperature,
            Field::Humidity => &mut conditions.humidity,
            Field::WindSpeed => &mut conditions.wind_speed,
            Field::AirQuality => &mut conditions.air_quality,
            Field::SeismicActivity => &mut conditions.seismic_activity,
            Field::WaterLevel => &mut conditions.water_level,
        }
    }
}

/// Which way onset moves a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rise,
    Fall,
}

/// Whether a delta is being applied at spawn or as relief.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Onset,
    Relief,
}

/// One row of the table: a field, a magnitude range and its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDelta {
    pub field: Field,
    pub min: f64,
    pub max: f64,
    pub direction: Direction,
    /// Cap (for `Rise`) or floor (for `Fall`) applied at onset.
    pub onset_limit: Option<f64>,
    /// Floor (for `Rise`) or cap (for `Fall`) applied during relief.
    pub relief_limit: f64,
}

/// Everything a disaster type does to its location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaSpec {
    pub disaster_type: DisasterType,
    /// Onset raises the smoke flag; resolution clears it.
    pub sets_smoke: bool,
    pub fields: &'static [FieldDelta],
}

const fn rise(field: Field, min: f64, max: f64, onset_limit: Option<f64>, relief_limit: f64) -> FieldDelta {
    FieldDelta {
        field,
        min,
        max,
        direction: Direction::Rise,
        onset_limit,
        relief_limit,
    }
}

const fn fall(field: Field, min: f64, max: f64, onset_limit: Option<f64>, relief_limit: f64) -> FieldDelta {
    FieldDelta {
        field,
        min,
        max,
        direction: Direction::Fall,
        onset_limit,
        relief_limit,
    }
}

/// Rows are in draw order; changing the order changes seeded replays.
pub static DELTA_TABLE: [DeltaSpec; 6] = [
    DeltaSpec {
        disaster_type: DisasterType::Flood,
        sets_smoke: false,
        fields: &[
            rise(Field::WaterLevel, 1.0, 5.0, None, 0.0),
            rise(Field::Humidity, 10.0, 20.0, Some(100.0), 30.0),
        ],
    },
    DeltaSpec {
        disaster_type: DisasterType::Earthquake,
        sets_smoke: false,
        fields: &[rise(Field::SeismicActivity, 4.0, 8.0, None, 0.0)],
    },
    DeltaSpec {
        disaster_type: DisasterType::Fire,
        sets_smoke: true,
        fields: &[
            rise(Field::AirQuality, 50.0, 100.0, None, 0.0),
            rise(Field::Temperature, 10.0, 30.0, None, 20.0),
        ],
    },
    DeltaSpec {
        disaster_type: DisasterType::Drought,
        sets_smoke: false,
        fields: &[
            fall(Field::Humidity, 20.0, 40.0, Some(0.0), 100.0),
            rise(Field::Temperature, 5.0, 15.0, None, 20.0),
        ],
    },
    DeltaSpec {
        disaster_type: DisasterType::Storm,
        sets_smoke: false,
        fields: &[
            rise(Field::WindSpeed, 20.0, 50.0, None, 0.0),
            rise(Field::Humidity, 10.0, 20.0, Some(100.0), 30.0),
        ],
    },
    DeltaSpec {
        disaster_type: DisasterType::Hurricane,
        sets_smoke: false,
        fields: &[
            rise(Field::WindSpeed, 50.0, 100.0, None, 0.0),
            rise(Field::Humidity, 20.0, 40.0, Some(100.0), 30.0),
            rise(Field::WaterLevel, 2.0, 6.0, None, 0.0),
        ],
    },
];

/// Looks up the row for a disaster type.
pub fn spec_for(disaster_type: DisasterType) -> &'static DeltaSpec {
    // Every variant has exactly one row; the fallback is never taken.
    DELTA_TABLE
        .iter()
        .find(|spec| spec.disaster_type == disaster_type)
        .unwrap_or(&DELTA_TABLE[0])
}

/// Applies one row to `conditions`, drawing each magnitude from `rng`.
///
/// Onset sets the smoke flag for smoky disasters; clearing it is left to the
/// caller because it only happens on resolution.
pub fn apply<R: Rng>(
    conditions: &mut ConditionVector,
    spec: &DeltaSpec,
    phase: Phase,
    rng: &mut R,
) {
    if phase == Phase::Onset && spec.sets_smoke {
        conditions.smoke_detected = true;
    }

    for delta in spec.fields {
        let magnitude = rng.gen_range(delta.min..=delta.max);
        let slot = delta.field.slot(conditions);

        *slot = match (delta.direction, phase) {
            (Direction::Rise, Phase::Onset) => {
                let raised = *slot + magnitude;
                delta.onset_limit.map_or(raised, |cap| raised.min(cap))
            }
            (Direction::Fall, Phase::Onset) => {
                let lowered = *slot - magnitude;
                delta.onset_limit.map_or(lowered, |floor| lowered.max(floor))
            }
            (Direction::Rise, Phase::Relief) => (*slot - magnitude).max(delta.relief_limit),
            (Direction::Fall, Phase::Relief) => (*slot + magnitude).min(delta.relief_limit),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn conditions() -> ConditionVector {
        ConditionVector {
            temperature: 30.0,
            humidity: 95.0,
            wind_speed: 10.0,
            air_quality: 100.0,
            seismic_activity: 0.0,
            water_level: 0.0,
            smoke_detected: false,
        }
    }

    #[test]
    fn test_every_type_has_one_row() {
        for disaster_type in DisasterType::all() {
            let rows = DELTA_TABLE
                .iter()
                .filter(|spec| spec.disaster_type == *disaster_type)
                .count();
            assert_eq!(rows, 1, "{:?} should have exactly one row", disaster_type);
            assert_eq!(spec_for(*disaster_type).disaster_type, *disaster_type);
        }
    }

    #[test]
    fn test_flood_onset_caps_humidity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut cond = conditions();
        apply(&mut cond, spec_for(DisasterType::Flood), Phase::Onset, &mut rng);

        assert!(cond.water_level >= 1.0 && cond.water_level <= 5.0);
        assert_eq!(cond.humidity, 100.0);
    }

    #[test]
    fn test_relief_respects_floors() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut cond = conditions();
        apply(&mut cond, spec_for(DisasterType::Hurricane), Phase::Relief, &mut rng);

        assert_eq!(cond.wind_speed, 0.0);
        assert_eq!(cond.water_level, 0.0);
        assert!(cond.humidity >= 30.0);
    }

    #[test]
    fn test_drought_moves_humidity_down_then_up() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut cond = conditions();
        cond.humidity = 50.0;

        apply(&mut cond, spec_for(DisasterType::Drought), Phase::Onset, &mut rng);
        assert!(cond.humidity <= 30.0 && cond.humidity >= 10.0);
        assert!(cond.temperature >= 35.0);

        apply(&mut cond, spec_for(DisasterType::Drought), Phase::Relief, &mut rng);
        assert!(cond.humidity <= 100.0);
        assert!(cond.temperature >= 20.0);
    }

    #[test]
    fn test_fire_onset_sets_smoke_and_relief_leaves_it() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut cond = conditions();

        apply(&mut cond, spec_for(DisasterType::Fire), Phase::Onset, &mut rng);
        assert!(cond.smoke_detected);
        assert!(cond.temperature >= 40.0);

        apply(&mut cond, spec_for(DisasterType::Fire), Phase::Relief, &mut rng);
        assert!(cond.smoke_detected);
    }

    #[test]
    fn test_same_seed_same_magnitudes() {
        let mut a = conditions();
        let mut b = conditions();
        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);

        for spec in DELTA_TABLE.iter() {
            apply(&mut a, spec, Phase::Onset, &mut rng_a);
            apply(&mut b, spec, Phase::Onset, &mut rng_b);
        }
        assert_eq!(a, b);
    }
}
