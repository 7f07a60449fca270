//! Execution Report
//!
//! End-of-run text report: goals, transitions, then the full trace.

use std::fs;
use std::path::Path;

use crate::systems::{ResponseController, GOALS};

/// Renders the report for a finished controller run.
pub fn render_execution_report(controller: &ResponseController, cycles: u32, seed: u64) -> String {
    let mut out = String::new();
    out.push_str("RESPONSE CONTROLLER EXECUTION TRACE\n");
    out.push_str(&"=".repeat(90));
    out.push('\n');
    out.push_str(&format!("Agent: {}\n", controller.agent_id()));
    out.push_str(&format!("Seed: {}\n", seed));
    out.push_str(&format!("Cycles: {}\n\n", cycles));

    out.push_str("GOALS\n");
    for goal in GOALS {
        out.push_str(&format!("- {}\n", goal));
    }
    out.push('\n');

    out.push_str("TRANSITIONS\n");
    if controller.transitions().is_empty() {
        out.push_str("No state transitions recorded.\n");
    } else {
        for transition in controller.transitions() {
            out.push_str(&format!("{}\n", transition));
        }
    }

    out.push_str("\nTRACE LOG\n");
    out.push_str(&"-".repeat(90));
    out.push('\n');
    for line in controller.trace() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Writes the rendered report to `path`, creating parent directories.
pub fn write_execution_report(
    path: impl AsRef<Path>,
    controller: &ResponseController,
    cycles: u32,
    seed: u64,
) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render_execution_report(controller, cycles, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_events::fixtures;
    use relief_events::{DisasterType, Severity};

    #[test]
    fn test_report_without_transitions() {
        let controller = ResponseController::new("RESPONSE-001");
        let report = render_execution_report(&controller, 0, 419);
        assert!(report.contains("Agent: RESPONSE-001"));
        assert!(report.contains("Seed: 419"));
        assert!(report.contains("- Minimize casualties through rapid rescue operations"));
        assert!(report.contains("No state transitions recorded."));
    }

    #[test]
    fn test_report_sections_in_order() {
        let mut controller = ResponseController::new("RESPONSE-001");
        let flood = fixtures::disaster("EVT0001", DisasterType::Flood, Severity::Severe);
        controller.react_cycle(&[fixtures::percept(fixtures::calm_conditions(), vec![flood])]);

        let report = render_execution_report(&controller, 1, 7);
        let goals = report.find("GOALS").unwrap();
        let transitions = report.find("TRANSITIONS").unwrap();
        let trace = report.find("TRACE LOG").unwrap();
        assert!(goals < transitions && transitions < trace);
        assert!(report.contains("[cycle_0001] MONITORING -> ASSESSING | Disaster-related event detected"));
        assert!(report.contains("RESPONSE-001 | Dispatch: Send 4 rescue teams"));
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("report.txt");
        let controller = ResponseController::new("RESPONSE-001");
        write_execution_report(&path, &controller, 3, 1).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("RESPONSE CONTROLLER EXECUTION TRACE"));
    }
}
