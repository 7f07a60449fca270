//! Trace Writer
//!
//! Append-only line sink for controller trace records.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Writes one trace record per line.
pub struct TraceWriter {
    writer: Option<BufWriter<File>>,
    line_count: u64,
}

impl TraceWriter {
    /// Create a writer that truncates `path`, creating parent directories
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            line_count: 0,
        })
    }

    /// Create a writer that discards lines (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            line_count: 0,
        }
    }

    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.line_count += 1;
        if let Some(ref mut writer) = self.writer {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    pub fn write_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> std::io::Result<()> {
        for line in lines {
            self.write_line(line.as_ref())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for TraceWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush trace writer");
        }
    }
}
