//! Configuration and file management for diffpanel
//!
//! This crate provides:
//! - File path utilities for config and log files
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig) with environment overrides

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::AppConfig;
pub use config_file::load_config_file;
