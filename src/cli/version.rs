use super::common::{CommandContext, TargetArgs};
use crate::constants::VERSIONED_PLATFORMS;
use crate::project::ProjectVersion;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

/// Read or write the project version kept in the platform options files.
#[derive(Debug, Args)]
pub struct VersionCommand {
    #[command(subcommand)]
    pub command: VersionSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum VersionSubcommand {
    /// Set the version on every platform with an options file
    Set {
        /// `1.2.3`, `1.2.3.4` or `1.2.3-rc.4`
        version: ProjectVersion,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show the version stored for each platform
    Show {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl VersionCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command {
            VersionSubcommand::Set { version, target } => {
                let project = ctx.open_target(&target.target)?;
                let platforms = project.set_version(&version)?;
                if platforms.is_empty() {
                    println!("{} No platform options files found", "!".yellow());
                } else {
                    println!("{} Set version {} on {}", "✓".green(), version, platforms.join(", "));
                }
            }
            VersionSubcommand::Show { target } => {
                let project = ctx.open_read_only(&target.target)?;
                for platform in VERSIONED_PLATFORMS {
                    if let Some(version) = project.version_on_platform(platform)? {
                        println!("{platform}: {version}");
                    }
                }
            }
        }
        Ok(())
    }
}
