//! Subprocess plumbing for the external diff renderer
//!
//! This crate knows how to:
//! - locate the renderer executable for either deployment mode (dev:
//!   interpreter-environment-relative; packaged: platform-specific
//!   pre-built binary) and build the full commandline invocation for a
//!   change selector,
//! - spawn the process, stream its stdout/stderr incrementally, and report
//!   once-per-second progress updates to an optional sink,
//! - resolve with captured output on exit 0 and reject with a typed error
//!   otherwise.
//!
//! Cache and orchestration concerns live elsewhere; nothing here decides
//! *whether* to run the tool, only *how*.

pub mod error;
pub mod invocation;
pub mod progress;
pub mod runner;

pub use error::RunnerError;
pub use invocation::{DeployMode, ToolInvocation};
pub use progress::{LogProgressSink, ProgressSink, ProgressUpdate};
pub use runner::{ProcessRunner, RunOutput, TokioProcessRunner};
