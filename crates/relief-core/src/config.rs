//! Run Configuration
//!
//! Everything tunable about a run, loaded from `relief.toml`. Every section
//! and field has a default, so a partial file (or none at all) is valid.

use negotiation::NegotiationConfig;
use relief_events::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::environment::{default_locations, EnvironmentParams};
use crate::error::{ConfigError, EnvironmentError};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "relief.toml";

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliefConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ReliefConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            info!(path = %path.display(), "loading configuration");
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.environment.validate()?;
        self.negotiation.validate()?;
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulation.seed = seed;
        self
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.simulation.cycles = cycles;
        self
    }

    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.simulation.interval_ms = interval_ms;
        self
    }

    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }
}

/// Controller loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the environment RNG
    pub seed: u64,
    /// Number of controller cycles
    pub cycles: u32,
    /// Pause between cycles
    pub interval_ms: u64,
    /// Name used in trace lines
    pub agent_id: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 419,
            cycles: 8,
            interval_ms: 1000,
            agent_id: "RESPONSE-001".to_string(),
        }
    }
}

/// Environment tunables and monitored locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub spawn_probability: f64,
    pub resolve_probability: f64,
    pub locations: Vec<Location>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let params = EnvironmentParams::default();
        Self {
            spawn_probability: params.spawn_probability,
            resolve_probability: params.resolve_probability,
            locations: default_locations(),
        }
    }
}

impl EnvironmentConfig {
    pub fn params(&self) -> EnvironmentParams {
        EnvironmentParams {
            spawn_probability: self.spawn_probability,
            resolve_probability: self.resolve_probability,
        }
    }

    fn validate(&self) -> Result<(), EnvironmentError> {
        self.params().validate()?;
        if self.locations.is_empty() {
            return Err(EnvironmentError::NoLocations);
        }
        let mut names = HashSet::new();
        for location in &self.locations {
            if !names.insert(location.name.as_str()) {
                return Err(EnvironmentError::DuplicateLocation(location.name.clone()));
            }
        }
        Ok(())
    }
}

/// Where the sinks write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub trace_file: String,
    pub disaster_log_file: String,
    pub negotiation_log_file: String,
    pub report_file: String,
    /// Also write the sensed-disaster log
    pub log_disasters: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            trace_file: "response_trace.txt".to_string(),
            disaster_log_file: "disaster_log.txt".to_string(),
            negotiation_log_file: "negotiation_trace.txt".to_string(),
            report_file: "response_report.txt".to_string(),
            log_disasters: true,
        }
    }
}

impl OutputConfig {
    pub fn trace_path(&self) -> PathBuf {
        self.directory.join(&self.trace_file)
    }

    pub fn disaster_log_path(&self) -> PathBuf {
        self.directory.join(&self.disaster_log_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.directory.join(&self.report_file)
    }

    pub fn negotiation_log_path(&self) -> PathBuf {
        self.directory.join(&self.negotiation_log_file)
    }
}
