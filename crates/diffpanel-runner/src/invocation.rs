//! Tool invocation construction
//!
//! Pure functions from (deployment mode, selector, output path) to a full
//! commandline invocation. Nothing here spawns anything.

use crate::error::RunnerError;
use diffpanel_cache::Selector;
use std::path::{Path, PathBuf};

/// How the renderer executable is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployMode {
    /// Development: run the tool out of an interpreter environment
    /// (its `bin/` (`Scripts\` on Windows) is also prepended to `PATH`
    /// so the tool finds its own helpers)
    Dev { env_dir: PathBuf },
    /// Packaged: run a pre-built binary for this OS and architecture
    Packaged { install_dir: PathBuf },
}

/// A fully constructed subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Absolute path (or bare name, in dev mode) of the executable
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment entries layered over the inherited environment
    pub env: Vec<(String, String)>,
    /// Working directory; always the repository root
    pub cwd: PathBuf,
}

impl ToolInvocation {
    /// Build the invocation for rendering one selector of a repository
    ///
    /// The argument shape is the tool's documented interface: a `diff` verb,
    /// `--staged` for the staged variant, a `<hash>~1..<hash>` range
    /// positional for a single commit, and always `--output <path>`
    /// plus `--no-open` to suppress the tool's own viewer.
    ///
    /// Packaged mode fails fast with [`RunnerError::ToolNotFound`] when the
    /// platform binary is missing; dev mode defers failure to spawn time.
    pub fn build(
        mode: &DeployMode,
        tool_command: &str,
        repo_root: &Path,
        selector: &Selector,
        output_path: &Path,
    ) -> Result<Self, RunnerError> {
        let mut args = vec!["diff".to_string()];
        match selector {
            Selector::Unstaged => {}
            Selector::Staged => args.push("--staged".to_string()),
            Selector::Commit(hash) => args.push(format!("{hash}~1..{hash}")),
        }
        args.push("--output".to_string());
        args.push(output_path.display().to_string());
        args.push("--no-open".to_string());

        let (program, env) = match mode {
            DeployMode::Dev { env_dir } => {
                let bin_dir = env_dir.join(bin_dir_name());
                let program = bin_dir.join(executable_name(tool_command));
                (program, vec![("PATH".to_string(), prepend_path(&bin_dir))])
            }
            DeployMode::Packaged { install_dir } => {
                let program = install_dir
                    .join("bin")
                    .join(platform_tag())
                    .join(executable_name(tool_command));
                if !program.is_file() {
                    return Err(RunnerError::ToolNotFound(program));
                }
                (program, Vec::new())
            }
        };

        Ok(Self {
            program,
            args,
            env,
            cwd: repo_root.to_path_buf(),
        })
    }
}

/// `{os}-{arch}` directory tag for packaged binaries, e.g. `linux-x86_64`
pub fn platform_tag() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

fn bin_dir_name() -> &'static str {
    if cfg!(windows) {
        "Scripts"
    } else {
        "bin"
    }
}

fn executable_name(tool_command: &str) -> String {
    format!("{}{}", tool_command, std::env::consts::EXE_SUFFIX)
}

fn prepend_path(bin_dir: &Path) -> String {
    let sep = if cfg!(windows) { ';' } else { ':' };
    match std::env::var("PATH") {
        Ok(path) => format!("{}{}{}", bin_dir.display(), sep, path),
        Err(_) => bin_dir.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dev_mode() -> DeployMode {
        DeployMode::Dev {
            env_dir: PathBuf::from("/opt/venv"),
        }
    }

    fn build(selector: &Selector) -> ToolInvocation {
        ToolInvocation::build(
            &dev_mode(),
            "diffviz",
            &PathBuf::from("/repo"),
            selector,
            &PathBuf::from("/tmp/out.html"),
        )
        .unwrap()
    }

    #[test]
    fn test_unstaged_args() {
        let inv = build(&Selector::Unstaged);
        assert_eq!(
            inv.args,
            vec!["diff", "--output", "/tmp/out.html", "--no-open"]
        );
        assert_eq!(inv.cwd, PathBuf::from("/repo"));
    }

    #[test]
    fn test_staged_args() {
        let inv = build(&Selector::Staged);
        assert!(inv.args.contains(&"--staged".to_string()));
        assert!(inv.args.contains(&"--output".to_string()));
    }

    #[test]
    fn test_commit_range_arg() {
        let inv = build(&Selector::commit("abc1234").unwrap());
        assert!(inv.args.contains(&"abc1234~1..abc1234".to_string()));
        assert!(!inv.args.contains(&"--staged".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_dev_mode_resolves_env_bin_and_path() {
        let inv = build(&Selector::Unstaged);
        assert_eq!(inv.program, PathBuf::from("/opt/venv/bin/diffviz"));
        let (key, value) = &inv.env[0];
        assert_eq!(key, "PATH");
        assert!(value.starts_with("/opt/venv/bin"));
    }

    #[test]
    fn test_packaged_mode_missing_binary_fails_fast() {
        let mode = DeployMode::Packaged {
            install_dir: PathBuf::from("/nonexistent-install"),
        };
        let err = ToolInvocation::build(
            &mode,
            "diffviz",
            &PathBuf::from("/repo"),
            &Selector::Unstaged,
            &PathBuf::from("/tmp/out.html"),
        )
        .unwrap_err();
        assert!(matches!(err, RunnerError::ToolNotFound(_)));
    }

    #[test]
    fn test_packaged_mode_finds_platform_binary() {
        let install = tempfile::tempdir().unwrap();
        let bin_dir = install.path().join("bin").join(platform_tag());
        std::fs::create_dir_all(&bin_dir).unwrap();
        let exe = bin_dir.join(format!("diffviz{}", std::env::consts::EXE_SUFFIX));
        std::fs::write(&exe, b"").unwrap();

        let mode = DeployMode::Packaged {
            install_dir: install.path().to_path_buf(),
        };
        let inv = ToolInvocation::build(
            &mode,
            "diffviz",
            &PathBuf::from("/repo"),
            &Selector::Staged,
            &PathBuf::from("/tmp/out.html"),
        )
        .unwrap();
        assert_eq!(inv.program, exe);
        assert!(inv.env.is_empty());
    }
}
