//! The artifact cache
//!
//! Maps a (repository root, selector) key to the location of a previously
//! rendered artifact. One entry per key, overwritten on regeneration,
//! removed on invalidation. Entries never expire on their own; all
//! invalidation is explicit. The cache is process-lifetime only; nothing
//! is persisted across restarts.
//!
//! The backing table sits behind a `Mutex` so the cache can be shared
//! across async tasks. None of the operations can fail: lookups on absent
//! keys report absence, and a poisoned lock is recovered rather than
//! propagated (the table holds plain data, so a panic mid-operation cannot
//! leave a half-written entry behind).

use crate::selector::Selector;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A cached artifact location for one (repository, selector) key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Where the rendered artifact was written
    pub artifact_path: PathBuf,
    /// When the entry was created or last overwritten
    pub generated_at: DateTime<Utc>,
}

/// In-memory table of rendered-artifact locations
///
/// Construct one per session and pass it to whoever needs it; there is no
/// global instance. The cache records what callers tell it; it does not
/// check whether artifact files still exist on disk (see the crate docs).
///
/// # Invalidation scope
///
/// `invalidate(repo, None)` sweeps only the `staged` and `unstaged`
/// variants. Commit-keyed entries are deliberately left alone: a commit's
/// diff against its first parent never changes, so once rendered it stays
/// valid for the life of the process.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ArtifactCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the entry for a repository + selector
    ///
    /// Pure lookup, no side effects. Returns a clone so the lock is not
    /// held across caller code.
    pub fn get(&self, repo_root: &Path, selector: &Selector) -> Option<CacheEntry> {
        let key = selector.cache_key(repo_root);
        self.lock().get(&key).cloned()
    }

    /// Record (or overwrite) the artifact location for a key
    ///
    /// Any previous entry for the same key is replaced wholesale and the
    /// timestamp refreshed. The old artifact file is not touched.
    pub fn set(&self, repo_root: &Path, selector: &Selector, artifact_path: impl Into<PathBuf>) {
        let key = selector.cache_key(repo_root);
        let entry = CacheEntry {
            artifact_path: artifact_path.into(),
            generated_at: Utc::now(),
        };
        debug!("cache set {} -> {}", key, entry.artifact_path.display());
        self.lock().insert(key, entry);
    }

    /// Remove cached entries for a repository
    ///
    /// With a selector, removes exactly that entry. Without one, removes
    /// the `staged` and `unstaged` entries; commit-keyed entries survive
    /// (see the type docs for why).
    pub fn invalidate(&self, repo_root: &Path, selector: Option<&Selector>) {
        let mut entries = self.lock();
        match selector {
            Some(selector) => {
                let key = selector.cache_key(repo_root);
                debug!("cache invalidate {key}");
                entries.remove(&key);
            }
            None => {
                for selector in [Selector::Staged, Selector::Unstaged] {
                    let key = selector.cache_key(repo_root);
                    debug!("cache invalidate {key}");
                    entries.remove(&key);
                }
            }
        }
    }

    /// Whether an entry exists for the key
    pub fn has(&self, repo_root: &Path, selector: &Selector) -> bool {
        let key = selector.cache_key(repo_root);
        self.lock().contains_key(&key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All current cache keys, for diagnostics
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn repo(name: &str) -> PathBuf {
        PathBuf::from(format!("/{name}"))
    }

    #[test]
    fn test_get_absent_key() {
        let cache = ArtifactCache::new();
        assert!(cache.get(&repo("repo"), &Selector::Staged).is_none());
        assert!(!cache.has(&repo("repo"), &Selector::Staged));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let cache = ArtifactCache::new();
        cache.set(&repo("repo"), &Selector::Unstaged, "/tmp/a.html");
        let entry = cache.get(&repo("repo"), &Selector::Unstaged).unwrap();
        assert_eq!(entry.artifact_path, PathBuf::from("/tmp/a.html"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_isolation_across_repos() {
        let cache = ArtifactCache::new();
        cache.set(&repo("one"), &Selector::Staged, "/tmp/a.html");
        assert!(cache.get(&repo("two"), &Selector::Staged).is_none());
        assert!(cache.has(&repo("one"), &Selector::Staged));
    }

    #[test]
    fn test_selector_isolation_within_repo() {
        let cache = ArtifactCache::new();
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/a.html");
        assert!(cache.get(&repo("repo"), &Selector::Unstaged).is_none());
        let commit = Selector::commit("abc1234").unwrap();
        assert!(cache.get(&repo("repo"), &commit).is_none());
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let cache = ArtifactCache::new();
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/first.html");
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/second.html");
        let entry = cache.get(&repo("repo"), &Selector::Staged).unwrap();
        assert_eq!(entry.artifact_path, PathBuf::from("/tmp/second.html"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_one_selector() {
        let cache = ArtifactCache::new();
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/s.html");
        cache.set(&repo("repo"), &Selector::Unstaged, "/tmp/u.html");
        cache.invalidate(&repo("repo"), Some(&Selector::Staged));
        assert!(!cache.has(&repo("repo"), &Selector::Staged));
        assert!(cache.has(&repo("repo"), &Selector::Unstaged));
    }

    #[test]
    fn test_invalidate_all_fixed_variants() {
        let cache = ArtifactCache::new();
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/s.html");
        cache.set(&repo("repo"), &Selector::Unstaged, "/tmp/u.html");
        cache.invalidate(&repo("repo"), None);
        assert!(!cache.has(&repo("repo"), &Selector::Staged));
        assert!(!cache.has(&repo("repo"), &Selector::Unstaged));
    }

    #[test]
    fn test_invalidate_all_spares_commit_entries() {
        let cache = ArtifactCache::new();
        let commit = Selector::commit("abc1234").unwrap();
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/s.html");
        cache.set(&repo("repo"), &commit, "/tmp/c.html");
        cache.invalidate(&repo("repo"), None);
        assert!(!cache.has(&repo("repo"), &Selector::Staged));
        assert!(cache.has(&repo("repo"), &commit));
    }

    #[test]
    fn test_invalidate_scoped_to_repo() {
        let cache = ArtifactCache::new();
        cache.set(&repo("one"), &Selector::Staged, "/tmp/a.html");
        cache.set(&repo("two"), &Selector::Staged, "/tmp/b.html");
        cache.invalidate(&repo("one"), None);
        assert!(!cache.has(&repo("one"), &Selector::Staged));
        assert!(cache.has(&repo("two"), &Selector::Staged));
    }

    #[test]
    fn test_keys_and_clear() {
        let cache = ArtifactCache::new();
        cache.set(&repo("repo"), &Selector::Staged, "/tmp/s.html");
        cache.set(&repo("repo"), &Selector::Unstaged, "/tmp/u.html");
        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["/repo:staged", "/repo:unstaged"]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
