//! Artifact file naming
//!
//! Generated artifacts land in the OS temp directory as
//! `{prefix}-{repoName}-{selectorTag}-{timestamp}-{seq}.html`. The
//! per-process sequence number breaks ties when two generations start
//! within the same millisecond, so every generation attempt gets a path no
//! previous attempt has used. Old artifacts are never deleted here; the OS
//! temp-directory retention policy bounds the leak.

use chrono::Utc;
use diffpanel_cache::Selector;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static SEQ: AtomicU64 = AtomicU64::new(0);

/// A fresh, unique output path for one generation attempt
pub fn output_path(prefix: &str, repo_root: &Path, selector: &Selector) -> PathBuf {
    let repo_name = repo_root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "repo".to_string());
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "{}-{}-{}-{}-{}.html",
        prefix,
        repo_name,
        selector.tag(),
        Utc::now().timestamp_millis(),
        seq
    ))
}
