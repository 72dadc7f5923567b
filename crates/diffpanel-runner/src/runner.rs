//! Subprocess execution with incremental output capture
//!
//! Spawns the tool invocation, streams stdout/stderr line by line while the
//! process runs (so the latest line can be surfaced as live progress), and
//! resolves with the captured output only on exit code 0.

use crate::error::RunnerError;
use crate::invocation::ToolInvocation;
use crate::progress::{ProgressSink, ProgressUpdate};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Captured output of a successful run
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes tool invocations
///
/// Abstracted behind a trait so orchestration flows can be tested with a
/// counting fake instead of real subprocesses.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the invocation to completion
    ///
    /// Resolves with captured output on exit 0; any other exit code or a
    /// spawn failure is an error. If a progress sink is supplied it
    /// receives one update per second for the duration of the run; this is
    /// cosmetic and never changes the outcome. Runs are not cancellable
    /// and have no timeout.
    async fn run(
        &self,
        invocation: &ToolInvocation,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<RunOutput, RunnerError>;
}

/// Real subprocess runner backed by `tokio::process`
#[derive(Debug, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<RunOutput, RunnerError> {
        let program = invocation.program.display().to_string();
        log::debug!(
            "spawning {} {:?} in {}",
            program,
            invocation.args,
            invocation.cwd.display()
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<(String, bool)>();

        if let Some(stdout) = child.stdout.take() {
            let tx = line_tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send((line, false)).is_err() {
                        break;
                    }
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            let tx = line_tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send((line, true)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(line_tx);

        let start = Instant::now();
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // first tick fires immediately

        let mut stdout_lines: Vec<String> = Vec::new();
        let mut stderr_lines: Vec<String> = Vec::new();
        let mut last_line: Option<String> = None;

        // Stream lines until both pipes close, then wait for the exit
        // status. Progress ticks interleave with line capture.
        let status = loop {
            tokio::select! {
                line = line_rx.recv() => {
                    match line {
                        Some((text, is_stderr)) => {
                            last_line = Some(text.clone());
                            if is_stderr {
                                stderr_lines.push(text);
                            } else {
                                stdout_lines.push(text);
                            }
                        }
                        None => {
                            break child.wait().await.map_err(|source| RunnerError::Spawn {
                                program: program.clone(),
                                source,
                            })?;
                        }
                    }
                }
                _ = interval.tick() => {
                    if let Some(sink) = &progress {
                        sink.report(ProgressUpdate {
                            elapsed: start.elapsed(),
                            last_line: last_line.clone(),
                        });
                    }
                }
            }
        };

        let stdout = stdout_lines.join("\n");
        let stderr = stderr_lines.join("\n");

        if status.success() {
            log::debug!("{} finished in {:?}", program, start.elapsed());
            Ok(RunOutput { stdout, stderr })
        } else {
            let code = status.code().unwrap_or(-1);
            log::warn!("{} exited with code {}", program, code);
            Err(RunnerError::ExitStatus { code, stderr })
        }
    }
}
