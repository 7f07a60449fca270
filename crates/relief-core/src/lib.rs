//! Core simulation logic: environment, event derivation, response control.
//!
//! One cooperative cycle drives everything in this crate:
//!
//! ```text
//! EnvironmentEngine::advance -> sense_all -> derive_events -> ResponseController::react
//! ```
//!
//! The negotiation actors live in the `negotiation` crate and consume the
//! same percepts through [`negotiation::PerceptFeed`], which the engine
//! implements.

pub mod config;
pub mod environment;
pub mod error;
pub mod output;
pub mod runner;
pub mod systems;

pub use config::{ReliefConfig, DEFAULT_CONFIG_PATH};
pub use environment::{default_locations, EnvironmentEngine, EnvironmentParams};
pub use error::{ConfigError, EnvironmentError};
pub use runner::{ResponseRunner, RunSummary};
pub use systems::{
    derive_events, prioritize, CycleOutcome, DispatchIntent, ResponseController, SeenEvents,
};
