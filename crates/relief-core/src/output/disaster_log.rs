//! Sensed-disaster log.
//!
//! One line per active disaster per sensed location per cycle. Write
//! failures are reported and swallowed so the cycle keeps going.

use relief_events::{DisasterEvent, Percept, SimTimestamp};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

pub struct DisasterLog {
    writer: BufWriter<File>,
    entries: u64,
}

impl DisasterLog {
    /// Opens `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            entries: 0,
        })
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Formats one log line.
    pub fn format_entry(timestamp: SimTimestamp, disaster: &DisasterEvent) -> String {
        format!(
            "[{}] {} | {} | Severity: {} | Casualties: {} | Area: {:.1} km²",
            timestamp,
            disaster.location.name,
            disaster.disaster_type,
            disaster.severity,
            disaster.casualties,
            disaster.affected_area
        )
    }

    /// Logs every disaster carried by `percepts`.
    pub fn record_percepts(&mut self, percepts: &[Percept]) {
        for percept in percepts {
            for disaster in &percept.active_disasters {
                self.record(percept.timestamp, disaster);
            }
        }
        if let Err(e) = self.writer.flush() {
            warn!(error = %e, "failed to flush disaster log");
        }
    }

    /// Logs one disaster. Failures are warned about, never returned.
    pub fn record(&mut self, timestamp: SimTimestamp, disaster: &DisasterEvent) {
        self.entries += 1;
        let line = Self::format_entry(timestamp, disaster);
        if let Err(e) = writeln!(self.writer, "{}", line) {
            warn!(event_id = %disaster.event_id, error = %e, "failed to log disaster");
        }
    }
}
