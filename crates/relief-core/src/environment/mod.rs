//! Environment simulation: monitored locations, conditions and disasters.

pub mod deltas;
pub mod engine;
pub mod feed;
pub mod setup;

pub use engine::{EnvironmentEngine, EnvironmentParams};
pub use setup::default_locations;
