//! diffpanel CLI
//!
//! Thin wiring around the orchestrator: a git-CLI repository provider, the
//! real subprocess runner, and a terminal presenter.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use diffpanel::presenter::TerminalPresenter;
use diffpanel::repos::{GitCliProvider, RepositoryResolver};
use diffpanel::DiffOrchestrator;
use diffpanel_cache::{ArtifactCache, Selector};
use diffpanel_config::AppConfig;
use diffpanel_runner::{LogProgressSink, TokioProcessRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "diffpanel",
    version,
    about = "Cached rendering of repository diffs via an external diff tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the diff, reusing a cached artifact when one is still on disk
    Open(SelectorArgs),
    /// Regenerate the diff, discarding any cached artifact
    Refresh(SelectorArgs),
}

#[derive(Args, Debug)]
struct SelectorArgs {
    /// Render the staged changes instead of the working tree
    #[arg(long, conflicts_with = "commit")]
    staged: bool,

    /// Render a single commit's diff against its first parent
    #[arg(long, value_name = "HASH", value_parser = parse_commit)]
    commit: Option<Selector>,

    /// Repository root (defaults to the repository containing the CWD)
    #[arg(long, value_name = "PATH")]
    repo: Option<PathBuf>,
}

impl SelectorArgs {
    fn selector(&self) -> Selector {
        if let Some(selector) = &self.commit {
            selector.clone()
        } else if self.staged {
            Selector::Staged
        } else {
            Selector::Unstaged
        }
    }
}

fn parse_commit(value: &str) -> Result<Selector, String> {
    Selector::commit(value).ok_or_else(|| "commit hash must be hexadecimal".to_string())
}

/// Route log output to the cache-dir log file, falling back to stderr when
/// the file cannot be created
fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    if let Ok(path) = diffpanel_config::paths::log_file_path() {
        if let Ok(file) = std::fs::File::create(&path) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let config = AppConfig::load();
    let resolver = Arc::new(RepositoryResolver::new(
        Arc::new(GitCliProvider),
        config.resolve_attempts,
        Duration::from_millis(config.resolve_delay_ms),
    ));
    let orchestrator = DiffOrchestrator::new(
        Arc::new(ArtifactCache::new()),
        Arc::new(TokioProcessRunner::new()),
        resolver,
        Arc::new(TerminalPresenter),
        config,
    )
    .with_progress_sink(Arc::new(LogProgressSink));

    match cli.command {
        Command::Open(args) => {
            orchestrator
                .open_diff(args.repo.as_deref(), &args.selector())
                .await
        }
        Command::Refresh(args) => {
            orchestrator
                .refresh_diff(args.repo.as_deref(), &args.selector())
                .await
        }
    }

    Ok(())
}
