//! Error types for the core simulation crate.

use thiserror::Error;

/// Errors raised by the environment engine.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// Sensing was asked for a location that is not monitored
    #[error("location not monitored: {0}")]
    NotFound(String),

    #[error("at least one location must be monitored")]
    NoLocations,

    #[error("duplicate location name: {0}")]
    DuplicateLocation(String),

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("negotiation config: {0}")]
    Negotiation(#[from] negotiation::NegotiationConfigError),

    #[error("environment config: {0}")]
    Environment(#[from] EnvironmentError),
}
