//! Runner error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from locating or executing the diff-rendering tool
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The packaged binary is not present where it should be installed
    #[error("Diff tool binary not found at {0}")]
    ToolNotFound(PathBuf),

    /// The process could not be started at all
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process started but exited with a non-zero status
    ///
    /// Carries the captured stderr as the diagnostic payload.
    #[error("Diff tool exited with code {code}: {stderr}")]
    ExitStatus { code: i32, stderr: String },
}
