//! Presentation contract
//!
//! The orchestrator drives a presentation surface it does not own. This
//! module defines the narrow interface it needs, plus a plain terminal
//! implementation for the CLI binary. Webview or editor-panel frontends
//! implement the same trait.

use anyhow::{Context, Result};
use std::path::Path;

/// Surface the orchestrator drives through loading / content / error states
pub trait Presenter: Send + Sync {
    /// Show a loading placeholder while an artifact is being generated
    fn show_loading(&self);

    /// Display the artifact at `path`
    ///
    /// Must fail (gracefully, with an error the orchestrator can surface
    /// or recover from) if the file no longer exists at display time,
    /// rather than showing nothing.
    fn show_artifact(&self, path: &Path) -> Result<()>;

    /// Show a user-visible error message
    fn show_error(&self, message: &str);

    /// Emit a non-error notification, e.g. "diff ready in 3.2s"
    fn notify(&self, message: &str);
}

/// Presenter that prints to the terminal
///
/// Used by the CLI binary; reads the artifact to confirm it is displayable
/// and prints its location.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn show_loading(&self) {
        println!("Generating diff...");
    }

    fn show_artifact(&self, path: &Path) -> Result<()> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Artifact no longer exists at {}", path.display()))?;
        println!("Diff ready: {} ({} bytes)", path.display(), metadata.len());
        Ok(())
    }

    fn show_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }
}
