//! Output Sinks
//!
//! Plain-text writers for the controller trace, the sensed-disaster log and
//! the end-of-run execution report. Sinks accept finished strings and
//! records; nothing here feeds back into the simulation.

pub mod disaster_log;
pub mod report;
pub mod trace;

pub use disaster_log::DisasterLog;
pub use report::{render_execution_report, write_execution_report};
pub use trace::TraceWriter;
