//! The diff orchestrator
//!
//! Single decision point between a UI-triggered operation and the cache,
//! subprocess, and presentation layers. Open prefers the cache; refresh
//! always regenerates. Both flows funnel through one generation path that
//! holds a per-key lock, so two rapid requests for the same
//! (repository, selector) collapse into a single subprocess run instead of
//! racing each other.
//!
//! A cache hit costs one filesystem existence check and spawns nothing;
//! the performance property the whole design exists for.

use crate::artifacts;
use crate::presenter::Presenter;
use crate::repos::RepositoryResolver;
use anyhow::{Context, Result};
use diffpanel_cache::{ArtifactCache, Selector};
use diffpanel_config::AppConfig;
use diffpanel_runner::{DeployMode, ProcessRunner, ProgressSink, ToolInvocation};
use log::{debug, error, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Orchestrates cache lookups, artifact generation, and presentation
///
/// Explicitly constructed and dependency-injected, no global state. One
/// instance per session; its cache lives exactly as long as it does.
pub struct DiffOrchestrator {
    cache: Arc<ArtifactCache>,
    runner: Arc<dyn ProcessRunner>,
    resolver: Arc<RepositoryResolver>,
    presenter: Arc<dyn Presenter>,
    config: AppConfig,
    progress: Option<Arc<dyn ProgressSink>>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DiffOrchestrator {
    pub fn new(
        cache: Arc<ArtifactCache>,
        runner: Arc<dyn ProcessRunner>,
        resolver: Arc<RepositoryResolver>,
        presenter: Arc<dyn Presenter>,
        config: AppConfig,
    ) -> Self {
        Self {
            cache,
            runner,
            resolver,
            presenter,
            config,
            progress: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a progress sink forwarded to every generation run
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Open the diff for a selector, reusing a cached artifact when one is
    /// still on disk
    ///
    /// Every failure ends in `Presenter::show_error`; nothing escapes.
    pub async fn open_diff(&self, repo: Option<&Path>, selector: &Selector) {
        if let Err(e) = self.open_inner(repo, selector).await {
            self.report_failure(&e);
        }
    }

    /// Regenerate the diff for a selector, discarding any cached artifact
    pub async fn refresh_diff(&self, repo: Option<&Path>, selector: &Selector) {
        if let Err(e) = self.refresh_inner(repo, selector).await {
            self.report_failure(&e);
        }
    }

    fn report_failure(&self, e: &anyhow::Error) {
        error!("diff operation failed: {e:#}");
        self.presenter.show_error(&format!("{e:#}"));
    }

    async fn open_inner(&self, repo: Option<&Path>, selector: &Selector) -> Result<()> {
        let repo = self.resolve_repo(repo).await?;

        if let Some(entry) = self.cache.get(&repo, selector) {
            if entry.artifact_path.is_file() {
                debug!(
                    "cache hit for {}: {}",
                    selector.cache_key(&repo),
                    entry.artifact_path.display()
                );
                match self.presenter.show_artifact(&entry.artifact_path) {
                    Ok(()) => return Ok(()),
                    // Vanished between the existence check and display;
                    // fall through and regenerate
                    Err(e) => warn!("cached artifact unusable, regenerating: {e:#}"),
                }
            } else {
                debug!(
                    "stale entry for {}: artifact missing, regenerating",
                    selector.cache_key(&repo)
                );
            }
        }

        self.generate(&repo, selector).await
    }

    async fn refresh_inner(&self, repo: Option<&Path>, selector: &Selector) -> Result<()> {
        let repo = self.resolve_repo(repo).await?;
        // Refresh never consults the existing entry
        self.cache.invalidate(&repo, Some(selector));
        self.generate(&repo, selector).await
    }

    async fn resolve_repo(&self, repo: Option<&Path>) -> Result<PathBuf> {
        if let Some(repo) = repo {
            return Ok(repo.to_path_buf());
        }
        let repos = self
            .resolver
            .list_repositories()
            .await
            .context("Could not resolve a repository")?;
        let first = repos
            .first()
            .cloned()
            .context("No repository is currently open")?;
        if repos.len() > 1 {
            debug!(
                "{} repositories open, using {}",
                repos.len(),
                first.display()
            );
        }
        Ok(first)
    }

    /// Generate a fresh artifact for the key and publish it
    ///
    /// Holds the key's in-flight lock for the whole run. A caller that
    /// queued behind an identical generation re-checks the cache after
    /// acquiring the lock and reuses the fresh artifact instead of
    /// spawning a second subprocess. Once the last user of a key's lock
    /// lets go, the lock is dropped from the in-flight map, so the map
    /// only ever holds keys with an active generation.
    async fn generate(&self, repo: &Path, selector: &Selector) -> Result<()> {
        let key = selector.cache_key(repo);
        let lock = self.key_lock(&key);
        let result = {
            let _held = lock.lock().await;
            self.generate_locked(repo, selector, &key).await
        };
        self.release_key_lock(&key, lock);
        result
    }

    async fn generate_locked(&self, repo: &Path, selector: &Selector, key: &str) -> Result<()> {
        if let Some(entry) = self.cache.get(repo, selector) {
            if entry.artifact_path.is_file() {
                debug!("generation for {key} already completed while queued");
                return self.presenter.show_artifact(&entry.artifact_path);
            }
        }

        self.presenter.show_loading();

        let output_path = artifacts::output_path(&self.config.artifact_prefix, repo, selector);
        let invocation = ToolInvocation::build(
            &self.deploy_mode(),
            &self.config.tool_command,
            repo,
            selector,
            &output_path,
        )?;

        let start = Instant::now();
        let output = self
            .runner
            .run(&invocation, self.progress.clone())
            .await
            .with_context(|| format!("Failed to render diff for {key}"))?;

        if !output.stderr.is_empty() {
            debug!("tool stderr: {}", output.stderr);
        }

        self.cache.set(repo, selector, &output_path);
        self.presenter.show_artifact(&output_path)?;
        self.presenter.notify(&format!(
            "Diff ready in {:.1}s",
            start.elapsed().as_secs_f64()
        ));
        Ok(())
    }

    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Return a key lock and drop it from the map when no one else holds it
    ///
    /// The handed-back clone is released while the map's mutex is held;
    /// clones are only ever taken under that same mutex, so the strong
    /// count cannot change underneath the check.
    fn release_key_lock(&self, key: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if in_flight
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            in_flight.remove(key);
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn deploy_mode(&self) -> DeployMode {
        if self.config.dev_mode {
            let env_dir = self
                .config
                .dev_env_dir
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".venv"));
            DeployMode::Dev { env_dir }
        } else {
            let install_dir = self
                .config
                .install_dir
                .as_deref()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::current_exe()
                        .ok()
                        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
                })
                .unwrap_or_else(|| PathBuf::from("."));
            DeployMode::Packaged { install_dir }
        }
    }
}
