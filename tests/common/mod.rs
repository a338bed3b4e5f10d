//! Common test utilities for Stitch integration tests
//!
//! A [`TestWorkspace`] holds a source and a target project side by side plus a
//! private config file, and runs the `stitch` binary against them.

// Not every suite uses every helper
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use stitch_cli::project::Project;
use stitch_cli::test_utils::ProjectFixture;
use tempfile::TempDir;

/// A source project, a target project and an isolated config directory.
pub struct TestWorkspace {
    pub source: ProjectFixture,
    pub target: ProjectFixture,
    config_dir: TempDir,
}

impl TestWorkspace {
    /// Two empty projects.
    pub fn new() -> Result<Self> {
        Ok(Self {
            source: ProjectFixture::new()?,
            target: ProjectFixture::new()?,
            config_dir: TempDir::new()?,
        })
    }

    /// Path of the config file the binary is pointed at.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("config.toml")
    }

    /// Write the global config used by [`Self::stitch`].
    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Source directory as a command-line argument.
    pub fn source_arg(&self) -> String {
        self.source.path().display().to_string()
    }

    /// Load the target fresh from disk.
    pub fn load_target(&self) -> Result<Project> {
        self.target.load()
    }

    /// `stitch` running in the target directory with a private config and
    /// colors off. The dirty tree guard is bypassed since fixtures are not
    /// git repositories.
    pub fn stitch(&self) -> Command {
        let mut cmd = self.stitch_guarded();
        cmd.arg("--allow-dirty");
        cmd
    }

    /// Like [`Self::stitch`] but with the dirty tree guard active.
    pub fn stitch_guarded(&self) -> Command {
        let mut cmd = Command::cargo_bin("stitch").expect("stitch binary is built");
        cmd.current_dir(self.target.path())
            .env("STITCH_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("STITCH_ALLOW_DIRTY")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Read a project file as bytes.
pub fn read_bytes(root: &Path, relative: &str) -> Vec<u8> {
    fs::read(root.join(relative)).unwrap_or_default()
}

/// Snapshot every file under `root` with its content, sorted by path.
pub fn snapshot(root: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(root)?.to_string_lossy().replace('\\', "/");
            files.push((relative, fs::read(entry.path())?));
        }
    }
    Ok(files)
}
