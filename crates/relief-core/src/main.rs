//! Disaster-response simulator binary.
//!
//! Runs the response controller loop and the negotiation actors side by
//! side, each over its own environment built from the same seed, then
//! writes the trace, the execution report and the negotiation report.

use clap::Parser;
use negotiation::Negotiation;
use relief_core::environment::EnvironmentEngine;
use relief_core::output::{DisasterLog, TraceWriter};
use relief_core::systems::ResponseController;
use relief_core::{ReliefConfig, ResponseRunner, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "relief_sim")]
#[command(about = "Disaster-response coordination simulator")]
struct Args {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of controller cycles
    #[arg(long)]
    cycles: Option<u32>,

    /// Pause between controller cycles (ms)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// How long the negotiation actors run (ms)
    #[arg(long)]
    negotiation_ms: Option<u64>,

    /// Run only the response controller
    #[arg(long)]
    skip_negotiation: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", ReliefConfig::default().to_toml()?);
        return Ok(());
    }

    let mut config = ReliefConfig::load_or_default(&args.config)?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(cycles) = args.cycles {
        config = config.with_cycles(cycles);
    }
    if let Some(interval_ms) = args.interval_ms {
        config = config.with_interval_ms(interval_ms);
    }
    if let Some(ms) = args.negotiation_ms {
        config.negotiation = config.negotiation.with_run_duration_ms(ms);
    }

    let sim = &config.simulation;
    info!(
        seed = sim.seed,
        cycles = sim.cycles,
        interval_ms = sim.interval_ms,
        locations = config.environment.locations.len(),
        "Configuration loaded"
    );

    let negotiation = if args.skip_negotiation {
        None
    } else {
        let feed = EnvironmentEngine::seeded(
            sim.seed,
            config.environment.locations.clone(),
            config.environment.params(),
        )?;
        Some(Negotiation::spawn(&config.negotiation, feed)?)
    };

    let engine = EnvironmentEngine::seeded(
        sim.seed,
        config.environment.locations.clone(),
        config.environment.params(),
    )?;
    let mut runner = ResponseRunner::new(
        engine,
        ResponseController::new(sim.agent_id.clone()),
        sim.cycles,
        Duration::from_millis(sim.interval_ms),
        sim.seed,
    );

    let output = &config.output;
    match TraceWriter::new(output.trace_path()) {
        Ok(writer) => runner = runner.with_trace_writer(writer),
        Err(e) => warn!(path = %output.trace_path().display(), error = %e, "trace file disabled"),
    }
    if output.log_disasters {
        match DisasterLog::open(output.disaster_log_path()) {
            Ok(log) => runner = runner.with_disaster_log(log),
            Err(e) => {
                warn!(path = %output.disaster_log_path().display(), error = %e, "disaster log disabled")
            }
        }
    }

    let summary = runner.run().await;
    runner.write_report(&output.report_path());
    println!("{}", runner.engine().summary());
    info!(
        cycles = summary.cycles,
        final_state = %summary.final_state,
        transitions = summary.transitions,
        dispatches = summary.dispatches.len(),
        disasters_spawned = summary.disasters_spawned,
        "Response run finished"
    );

    if let Some(handle) = negotiation {
        let report = handle.run_for(negotiation_time_left(&config)).await?;

        if let Err(e) = report.write(output.negotiation_log_path()) {
            warn!(path = %output.negotiation_log_path().display(), error = %e, "failed to write negotiation report");
        }
        if !report.audit.is_balanced() {
            warn!(
                reused = report.audit.reused_event_ids.len(),
                "resource ledger does not balance; event ids were re-requested"
            );
        }
        info!(
            conversations = report.conversations.len(),
            granted = report.granted(),
            declined = report.declined(),
            "Negotiation finished"
        );
    }

    Ok(())
}

/// What is left of the negotiation's run time once the controller has slept
/// through all of its cycles. The two were spawned together.
fn negotiation_time_left(config: &ReliefConfig) -> Duration {
    let sim = &config.simulation;
    let controller_ms = sim.interval_ms.saturating_mul(u64::from(sim.cycles));
    config
        .negotiation
        .run_duration()
        .saturating_sub(Duration::from_millis(controller_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_gets_the_remainder() {
        let mut config = ReliefConfig::default().with_cycles(8).with_interval_ms(1000);
        config.negotiation = config.negotiation.with_run_duration_ms(30_000);
        assert_eq!(negotiation_time_left(&config), Duration::from_secs(22));
    }

    #[test]
    fn test_huge_cli_values_do_not_overflow() {
        let config = ReliefConfig::default()
            .with_cycles(u32::MAX)
            .with_interval_ms(u64::MAX);
        assert_eq!(negotiation_time_left(&config), Duration::ZERO);
    }
}
