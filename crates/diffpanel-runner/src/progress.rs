//! Progress side channel for long-running tool invocations
//!
//! Purely cosmetic: sinks receive periodic updates while the subprocess
//! runs so a UI can show elapsed time and the tool's last output line.
//! Nothing reported here affects the outcome of the run.

use std::time::Duration;

/// One periodic progress report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Wall-clock time since the process was spawned
    pub elapsed: Duration,
    /// Most recent line the tool wrote to stdout or stderr, if any
    pub last_line: Option<String>,
}

/// Receiver for periodic progress updates
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Sink that logs progress at debug level
#[derive(Debug, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn report(&self, update: ProgressUpdate) {
        match &update.last_line {
            Some(line) => log::debug!("rendering ({}s): {}", update.elapsed.as_secs(), line),
            None => log::debug!("rendering ({}s)", update.elapsed.as_secs()),
        }
    }
}
