//! diffpanel: cache-aware orchestration for an external diff renderer
//!
//! Sits between a UI trigger ("show the staged diff for this repository")
//! and an expensive external rendering subprocess. For every request it
//! decides cache-hit versus regenerate, keys and invalidates generated
//! artifacts per (repository, selector), serializes concurrent
//! regeneration of the same key, and drives the presentation surface
//! through loading / content / error states.
//!
//! The pieces:
//! - [`orchestrator::DiffOrchestrator`]: the decision point
//! - [`repos`]: repository discovery with retry over an
//!   eventually-consistent VCS backend
//! - [`presenter::Presenter`]: the consumed presentation contract
//! - `diffpanel-cache`, `diffpanel-runner`, `diffpanel-config`: the
//!   artifact cache, subprocess plumbing, and configuration

pub mod artifacts;
pub mod orchestrator;
pub mod presenter;
pub mod repos;

pub use orchestrator::DiffOrchestrator;
pub use presenter::Presenter;
pub use repos::{RepositoryProvider, RepositoryResolver, ResolveError};
