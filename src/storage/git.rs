//! Version-control guard.
//!
//! Stitch refuses to rewrite a project whose git working tree has uncommitted
//! changes, so every mutation it makes can be reviewed and reverted with git.
//! The system `git` binary is used, located with `which`.

use crate::core::StitchError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Locate the `git` executable on `PATH`.
pub fn git_command() -> Result<PathBuf> {
    which::which("git").map_err(|_| StitchError::GitNotFound.into())
}

/// Whether `dir` sits in a git working tree with no pending changes.
///
/// A directory outside any repository is never clean.
pub fn is_working_tree_clean(dir: &Path) -> Result<bool> {
    let git = git_command()?;
    let output = Command::new(&git)
        .args(["status", "--porcelain"])
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to run git status in {}", dir.display()))?;

    if !output.status.success() {
        debug!(
            "git status failed in {}: {}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(false);
    }

    let dirty = output.stdout.iter().any(|b| !b.is_ascii_whitespace());
    if dirty {
        debug!("Working tree at {} has uncommitted changes", dir.display());
    }
    Ok(!dirty)
}
