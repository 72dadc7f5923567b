//! Change selectors and cache-key serialization
//!
//! A selector identifies which change-set of a repository is being rendered.
//! Together with the repository root it forms the cache key; two distinct
//! (repository, selector) pairs must never collide to the same key string.

use std::fmt;
use std::path::Path;

/// Hex commit object id
///
/// Only constructible through [`Selector::commit`], which validates the
/// hex-only form. Hex can never contain the `:` key delimiter, so commit
/// cache keys cannot be forged into colliding with other keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which change-set of a repository to render
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Working-tree changes not yet staged
    Unstaged,
    /// Changes staged for the next commit
    Staged,
    /// A single commit's diff against its first parent
    Commit(CommitHash),
}

impl Selector {
    /// Build a commit selector, rejecting anything that is not a plain hex
    /// object id
    ///
    /// The sole way to obtain a [`Selector::Commit`] value.
    pub fn commit(hash: impl Into<String>) -> Option<Self> {
        let hash = hash.into();
        if !hash.is_empty() && hash.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Selector::Commit(CommitHash(hash)))
        } else {
            None
        }
    }

    /// Canonical tag used inside cache keys and artifact file names
    ///
    /// `"unstaged"`, `"staged"`, or `"commit-<hash>"`.
    pub fn tag(&self) -> String {
        match self {
            Selector::Unstaged => "unstaged".to_string(),
            Selector::Staged => "staged".to_string(),
            Selector::Commit(hash) => format!("commit-{hash}"),
        }
    }

    /// Canonical cache key for this selector within a repository
    ///
    /// Serialized as `"{repo_root}:{tag}"`, e.g. `/repo:staged` or
    /// `/repo:commit-abc1234`. This format is stable; tests and any future
    /// persistence rely on it.
    pub fn cache_key(&self, repo_root: &Path) -> String {
        format!("{}:{}", repo_root.display(), self.tag())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
