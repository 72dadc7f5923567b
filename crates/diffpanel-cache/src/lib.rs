//! In-memory artifact cache for rendered diffs
//!
//! This crate provides:
//! - The change `Selector` (unstaged / staged / specific commit) and its
//!   canonical cache-key serialization
//! - The `ArtifactCache`, the single source of truth for "is there already
//!   a usable rendered artifact for this repository + selector"
//!
//! The cache stores what it was told and nothing more. It never touches the
//! filesystem; deciding whether a cached artifact file still exists is the
//! orchestrator's job, since only the orchestrator knows when artifacts are
//! being actively rewritten.

pub mod cache;
pub mod selector;

pub use cache::{ArtifactCache, CacheEntry};
pub use selector::{CommitHash, Selector};
