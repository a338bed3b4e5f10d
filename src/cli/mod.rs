//! Command-line interface for Stitch.
//!
//! Each command lives in its own module with its own clap argument struct
//! and an `execute` method.
//!
//! # Available Commands
//!
//! ## Moving resources between projects
//! - `merge` - Copy resources matching folder/name patterns from another project
//! - `import-modules` - Copy whole module folders from another project
//!
//! ## Inspection
//! - `lint` - Report unreferenced global functions and outdated versioned calls
//!
//! ## Maintenance
//! - `jsonify` - Rewrite descriptor files in canonical form
//! - `groups` - Manage folder-based texture and audio group assignments
//! - `version` - Read or write the project version
//!
//! # Usage
//!
//! ```bash
//! # Bring a shared library's Pack module into this project
//! stitch import-modules ../SharedLib --module Pack
//!
//! # Merge every UI sprite, replacing nothing outside the pattern
//! stitch merge shared --if-folder-matches '^Sprites/UI' --on-clobber skip
//!
//! # Lint with versioned function names
//! stitch lint --suffix '(_v\d+)?'
//! ```
//!
//! Every command that writes refuses to run on a git working tree with
//! uncommitted changes unless `--allow-dirty` is given.

pub mod common;
mod groups;
mod import_modules;
mod jsonify;
mod lint;
mod merge;
mod version;

use crate::config::GlobalConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use common::CommandContext;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,
    /// Explicit global config file
    pub config_path: Option<PathBuf>,
    /// Skip the clean working tree guard
    pub allow_dirty: bool,
    /// Disable colored output
    pub no_color: bool,
}

impl CliConfig {
    /// Install the tracing subscriber. `RUST_LOG` overrides the level.
    ///
    /// Logs go to stderr so reports on stdout stay machine readable.
    /// Returns whether a subscriber was installed; one installed earlier in
    /// the process is kept.
    pub fn init_logging(&self) -> bool {
        let Some(level) = &self.log_level else {
            return false;
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("stitch_cli={level},warn")));
        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(!self.no_color)
            .try_init()
        {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Keeping existing log subscriber: {e}");
                false
            }
        }
    }
}

/// Stitch - merge, import and lint GameMaker Studio 2 projects
#[derive(Parser)]
#[command(
    name = "stitch",
    about = "Stitch - merge, import and lint GameMaker Studio 2 projects",
    version,
    long_about = "Stitch manages GameMaker Studio 2.3+ projects from the command line: \
                  it merges resources and modules between projects, lints GML code and \
                  keeps texture and audio group assignments in sync."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file
    #[arg(short, long, global = true, env = "STITCH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Allow writing to a project with uncommitted git changes
    #[arg(long, global = true, env = "STITCH_ALLOW_DIRTY")]
    allow_dirty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge resources matching patterns from another project
    Merge(merge::MergeCommand),

    /// Import module folders from another project
    ImportModules(import_modules::ImportModulesCommand),

    /// Lint GML functions and versioned references
    Lint(lint::LintCommand),

    /// Rewrite descriptor files in canonical form
    Jsonify(jsonify::JsonifyCommand),

    /// Manage texture and audio group assignments
    Groups(groups::GroupsCommand),

    /// Read or write the project version
    Version(version::VersionCommand),
}

impl Cli {
    /// Run the selected command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            allow_dirty: self.allow_dirty,
            no_color: self.no_color,
        }
    }

    /// Run the selected command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        if config.no_color {
            colored::control::set_override(false);
        }

        let ctx = CommandContext {
            config: GlobalConfig::load_with_optional(config.config_path.clone()).await?,
            allow_dirty: config.allow_dirty,
        };

        match self.command {
            Commands::Merge(cmd) => cmd.execute(&ctx).await,
            Commands::ImportModules(cmd) => cmd.execute(&ctx).await,
            Commands::Lint(cmd) => cmd.execute(&ctx).await,
            Commands::Jsonify(cmd) => cmd.execute().await,
            Commands::Groups(cmd) => cmd.execute(&ctx).await,
            Commands::Version(cmd) => cmd.execute(&ctx).await,
        }
    }
}
