//! Repository discovery
//!
//! Abstracts "what repositories exist" behind a narrow provider trait and
//! wraps it with the resilience the host's eventually-consistent
//! initialization requires: the backend may briefly report zero
//! repositories while it is still starting up, so the resolver polls with
//! a bounded attempt count and fixed delay before giving up with a
//! distinguishable timeout. Periodic callers (a tree-refresh loop) can
//! treat the timeout as "try again later" instead of fatal.

use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from repository resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The VCS backend itself failed
    #[error("VCS backend error: {0}")]
    Provider(#[source] anyhow::Error),

    /// The backend kept reporting zero repositories for every attempt
    ///
    /// Distinguished from [`ResolveError::Provider`] so periodic callers
    /// can retry indefinitely at a slower cadence.
    #[error("No repositories found after {attempts} attempts (VCS backend may still be initializing)")]
    Timeout { attempts: u32 },
}

/// Narrow interface over the host's VCS backend
///
/// Exactly the shape the core consumes: the currently known repository
/// roots. An empty list means "none known yet"; the backend may still be
/// initializing.
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    async fn list_repositories(&self) -> anyhow::Result<Vec<PathBuf>>;
}

/// Provider backed by the `git` CLI
///
/// Reports the repository containing the current working directory, or
/// nothing when there is none.
#[derive(Debug, Default)]
pub struct GitCliProvider;

#[async_trait]
impl RepositoryProvider for GitCliProvider {
    async fn list_repositories(&self) -> anyhow::Result<Vec<PathBuf>> {
        let output = tokio::process::Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .await;
        match output {
            Ok(output) if output.status.success() => {
                let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(vec![PathBuf::from(root)])
            }
            // Not inside a repository, or git missing: nothing to report
            _ => Ok(Vec::new()),
        }
    }
}

/// Retrying, memoizing front for a [`RepositoryProvider`]
///
/// The first successful resolution is cached for the resolver's lifetime;
/// `refresh()` forces a re-poll. An async mutex serializes the whole
/// polling loop, so concurrent first-time callers share one resolution
/// attempt instead of each polling the backend independently.
pub struct RepositoryResolver {
    provider: Arc<dyn RepositoryProvider>,
    attempts: u32,
    delay: Duration,
    resolved: Mutex<Option<Vec<PathBuf>>>,
}

impl RepositoryResolver {
    pub fn new(provider: Arc<dyn RepositoryProvider>, attempts: u32, delay: Duration) -> Self {
        Self {
            provider,
            attempts: attempts.max(1),
            delay,
            resolved: Mutex::new(None),
        }
    }

    /// Currently known repository roots
    ///
    /// Polls the provider up to the configured attempt count while it
    /// reports zero repositories, sleeping the configured delay between
    /// polls. Provider failures propagate immediately.
    pub async fn list_repositories(&self) -> Result<Vec<PathBuf>, ResolveError> {
        let mut resolved = self.resolved.lock().await;
        if let Some(repos) = resolved.as_ref() {
            return Ok(repos.clone());
        }

        for attempt in 1..=self.attempts {
            let repos = self
                .provider
                .list_repositories()
                .await
                .map_err(ResolveError::Provider)?;
            if !repos.is_empty() {
                debug!("resolved {} repositories on attempt {}", repos.len(), attempt);
                *resolved = Some(repos.clone());
                return Ok(repos);
            }
            debug!("no repositories yet (attempt {}/{})", attempt, self.attempts);
            if attempt < self.attempts {
                tokio::time::sleep(self.delay).await;
            }
        }

        Err(ResolveError::Timeout {
            attempts: self.attempts,
        })
    }

    /// Drop the memoized repository list so the next call re-polls
    pub async fn refresh(&self) {
        *self.resolved.lock().await = None;
    }
}
