//! Negotiation settings, loaded as the `[negotiation]` table of the run
//! configuration.

use relief_events::{ResourceKind, ResourceMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::NegotiationConfigError;
use crate::ledger::AccountingMode;

/// Timing, accounting and stock for one negotiation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Pause between reporter scans
    pub reporter_interval_ms: u64,
    /// How long an actor waits on its mailbox before looping
    pub receive_timeout_ms: u64,
    /// Wall time the binary lets the actors run
    pub run_duration_ms: u64,
    /// What to do when an event id is requested twice
    pub accounting: AccountingMode,
    /// Coordinator stock, keyed by resource kind name
    pub initial_pool: BTreeMap<String, u32>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        let initial_pool = [
            ("rescue_teams", 20),
            ("medical_kits", 100),
            ("fire_trucks", 10),
            ("ambulances", 15),
        ]
        .into_iter()
        .map(|(kind, amount)| (kind.to_string(), amount))
        .collect();

        Self {
            reporter_interval_ms: 3000,
            receive_timeout_ms: 10_000,
            run_duration_ms: 30_000,
            accounting: AccountingMode::default(),
            initial_pool,
        }
    }
}

impl NegotiationConfig {
    /// Checks durations and pool keys.
    pub fn validate(&self) -> Result<(), NegotiationConfigError> {
        if self.reporter_interval_ms == 0 {
            return Err(NegotiationConfigError::ZeroDuration("reporter_interval_ms"));
        }
        if self.receive_timeout_ms == 0 {
            return Err(NegotiationConfigError::ZeroDuration("receive_timeout_ms"));
        }
        self.pool().map(|_| ())
    }

    /// Parses the configured stock into typed kinds.
    pub fn pool(&self) -> Result<ResourceMap, NegotiationConfigError> {
        self.initial_pool
            .iter()
            .map(|(name, amount)| {
                name.parse::<ResourceKind>()
                    .map(|kind| (kind, *amount))
                    .map_err(|_| NegotiationConfigError::UnknownResource(name.clone()))
            })
            .collect()
    }

    pub fn reporter_interval(&self) -> Duration {
        Duration::from_millis(self.reporter_interval_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_millis(self.run_duration_ms)
    }

    pub fn with_pool(mut self, pool: &ResourceMap) -> Self {
        self.initial_pool = pool
            .iter()
            .map(|(kind, amount)| (kind.as_str().to_string(), *amount))
            .collect();
        self
    }

    pub fn with_accounting(mut self, accounting: AccountingMode) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn with_reporter_interval_ms(mut self, ms: u64) -> Self {
        self.reporter_interval_ms = ms;
        self
    }

    pub fn with_run_duration_ms(mut self, ms: u64) -> Self {
        self.run_duration_ms = ms;
        self
    }
}
