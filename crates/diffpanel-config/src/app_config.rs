//! Application configuration
//!
//! Configuration loaded from `.diffpanel.toml`, with a handful of
//! environment-variable overrides for deployment-mode selection.

use serde::{Deserialize, Serialize};

/// Environment variable enabling dev-mode tool resolution
pub const ENV_DEV_MODE: &str = "DIFFPANEL_DEV_MODE";
/// Environment variable overriding the interpreter environment directory
pub const ENV_DEV_ENV_DIR: &str = "DIFFPANEL_ENV_DIR";
/// Environment variable overriding the packaged-binary install root
pub const ENV_INSTALL_DIR: &str = "DIFFPANEL_INSTALL_DIR";

/// Application configuration loaded from `.diffpanel.toml`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Name of the external diff-rendering executable
    #[serde(default = "default_tool_command")]
    pub tool_command: String,

    /// Run the tool from an interpreter environment instead of a packaged
    /// binary
    #[serde(default)]
    pub dev_mode: bool,

    /// Interpreter environment directory for dev mode (e.g. a venv root)
    #[serde(default)]
    pub dev_env_dir: Option<String>,

    /// Root directory holding packaged platform binaries
    #[serde(default)]
    pub install_dir: Option<String>,

    /// File-name prefix for generated artifacts in the temp directory
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,

    /// How many times to poll the VCS backend for repositories before
    /// reporting a timeout
    #[serde(default = "default_resolve_attempts")]
    pub resolve_attempts: u32,

    /// Delay between repository polls, in milliseconds
    #[serde(default = "default_resolve_delay_ms")]
    pub resolve_delay_ms: u64,
}

fn default_tool_command() -> String {
    "diffviz".to_string()
}

fn default_artifact_prefix() -> String {
    "diffpanel".to_string()
}

fn default_resolve_attempts() -> u32 {
    10
}

fn default_resolve_delay_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tool_command: default_tool_command(),
            dev_mode: false,
            dev_env_dir: None,
            install_dir: None,
            artifact_prefix: default_artifact_prefix(),
            resolve_attempts: default_resolve_attempts(),
            resolve_delay_ms: default_resolve_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, or use defaults,
    /// then apply environment overrides
    pub fn load() -> Self {
        let mut config = if let Some(content) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded app config from file");
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                    Self::default()
                }
            }
        } else {
            log::debug!("Using default app config");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides via a lookup function
    ///
    /// `DIFFPANEL_DEV_MODE=1` (or `true`) switches to dev-mode resolution;
    /// `DIFFPANEL_ENV_DIR` and `DIFFPANEL_INSTALL_DIR` override the
    /// corresponding directories.
    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var(ENV_DEV_MODE) {
            self.dev_mode = value == "1" || value.eq_ignore_ascii_case("true");
        }
        if let Some(dir) = var(ENV_DEV_ENV_DIR) {
            self.dev_env_dir = Some(dir);
        }
        if let Some(dir) = var(ENV_INSTALL_DIR) {
            self.install_dir = Some(dir);
        }
    }
}
