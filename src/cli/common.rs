//! Helpers shared by the command implementations.

use crate::config::GlobalConfig;
use crate::project::{Project, ProjectOptions};
use crate::source::{LocalSource, SourceResolver};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output format of commands that produce a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored
    #[default]
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Settings every command receives from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Global configuration, already loaded
    pub config: GlobalConfig,
    /// Skip the clean working tree guard
    pub allow_dirty: bool,
}

impl CommandContext {
    /// Open the project a command writes to.
    pub fn open_target(&self, dir: &Path) -> Result<Project> {
        Project::load(
            dir,
            ProjectOptions {
                read_only: false,
                allow_dirty: self.allow_dirty,
            },
        )
    }

    /// Open a project for reading only.
    pub fn open_read_only(&self, dir: &Path) -> Result<Project> {
        Project::load(
            dir,
            ProjectOptions {
                read_only: true,
                allow_dirty: true,
            },
        )
    }

    /// Resolve a source coordinate through the configured aliases and open it.
    pub async fn open_source(&self, coordinate: &str) -> Result<Project> {
        let path = LocalSource::from_config(&self.config).resolve(coordinate).await?;
        self.open_read_only(&path)
    }
}

/// The target directory flag shared by project commands.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Project directory or `.yyp` file to operate on
    #[arg(long, short = 't', value_name = "DIR", default_value = ".")]
    pub target: PathBuf,
}

/// Print a report in the requested format.
pub fn print_report<T: Serialize>(format: OutputFormat, report: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let text = render(report);
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }
    Ok(())
}
