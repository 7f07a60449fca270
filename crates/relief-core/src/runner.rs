//! Response Runner
//!
//! Drives the cooperative controller loop for a fixed number of cycles:
//! advance the environment, sense, react, forward the trace, sleep.

use relief_events::ResponseState;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::environment::EnvironmentEngine;
use crate::output::{write_execution_report, DisasterLog, TraceWriter};
use crate::systems::{DispatchIntent, ResponseController};

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: u32,
    pub final_state: ResponseState,
    pub transitions: usize,
    pub events_derived: usize,
    pub disasters_spawned: u32,
    pub disasters_seen: usize,
    pub dispatches: Vec<DispatchIntent>,
}

pub struct ResponseRunner {
    engine: EnvironmentEngine,
    controller: ResponseController,
    trace: TraceWriter,
    disaster_log: Option<DisasterLog>,
    cycles: u32,
    interval: Duration,
    seed: u64,
}

impl ResponseRunner {
    pub fn new(
        engine: EnvironmentEngine,
        controller: ResponseController,
        cycles: u32,
        interval: Duration,
        seed: u64,
    ) -> Self {
        Self {
            engine,
            controller,
            trace: TraceWriter::null(),
            disaster_log: None,
            cycles,
            interval,
            seed,
        }
    }

    pub fn with_trace_writer(mut self, trace: TraceWriter) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_disaster_log(mut self, log: DisasterLog) -> Self {
        self.disaster_log = Some(log);
        self
    }

    pub fn engine(&self) -> &EnvironmentEngine {
        &self.engine
    }

    pub fn controller(&self) -> &ResponseController {
        &self.controller
    }

    /// Runs every cycle and returns the totals.
    pub async fn run(&mut self) -> RunSummary {
        let mut events_derived = 0;
        let mut dispatches = Vec::new();

        self.note("Starting goal-driven reactive response agent");
        let initial = format!("Initial state: {}", self.controller.state());
        self.note(&initial);

        for cycle in 1..=self.cycles {
            self.note(&format!("--- CYCLE {}/{} ---", cycle, self.cycles));

            self.engine.advance();
            let percepts = self.engine.sense_all();
            if let Some(log) = self.disaster_log.as_mut() {
                log.record_percepts(&percepts);
            }

            let outcome = self.controller.react_cycle(&percepts);
            self.forward(&outcome.trace_lines);
            events_derived += outcome.events.len();
            dispatches.extend(outcome.dispatch);

            info!(
                cycle,
                events = outcome.events.len(),
                active_disasters = self.engine.active_disasters().len(),
                state = %self.controller.state(),
                "cycle complete"
            );

            if !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
        }

        self.note("Simulation completed");
        if let Err(e) = self.trace.flush() {
            warn!(error = %e, "failed to flush trace");
        }

        RunSummary {
            cycles: self.cycles,
            final_state: self.controller.state(),
            transitions: self.controller.transitions().len(),
            events_derived,
            disasters_spawned: self.engine.spawned_count(),
            disasters_seen: self.controller.seen().len(),
            dispatches,
        }
    }

    /// Writes the execution report. Failures are reported, not returned.
    pub fn write_report(&mut self, path: &Path) -> bool {
        match write_execution_report(path, &self.controller, self.cycles, self.seed) {
            Ok(()) => {
                self.note(&format!("Execution trace saved to {}", path.display()));
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write execution report");
                false
            }
        }
    }

    fn note(&mut self, message: &str) {
        let line = self.controller.note(message);
        self.forward(&[line]);
    }

    fn forward(&mut self, lines: &[String]) {
        if let Err(e) = self.trace.write_lines(lines) {
            warn!(error = %e, "failed to write trace lines");
        }
    }
}
