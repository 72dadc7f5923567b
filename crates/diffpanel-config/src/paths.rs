//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/diffpanel/`, `~/.cache/diffpanel/`
//! - macOS: `~/Library/Application Support/diffpanel/`, `~/Library/Caches/diffpanel/`
//! - Windows: `%APPDATA%\diffpanel\`, `%LOCALAPPDATA%\diffpanel\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "diffpanel";

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the application cache directory
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get path to the log file
pub fn log_file_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("diffpanel.log"))
}
