//! Response Systems
//!
//! Event derivation from percepts and the finite-state response controller.

pub mod derive;
pub mod response;

pub use derive::{
    derive_events, SeenEvents, RESOURCE_SHORTAGE_RESCUE_TEAMS, SEVERITY_ESCALATION_LEVEL,
    TEMP_SPIKE_CELSIUS, WATER_RISE_METERS,
};
pub use response::{
    prioritize, CycleOutcome, DispatchIntent, ResponseController, GOALS, GOAL_OPTIMIZE_RESOURCES,
    GOAL_RESCUE_PEOPLE, GOAL_STABILIZE_INFRASTRUCTURE,
};
