use super::common::{CommandContext, TargetArgs};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

/// Manage folder-based texture and audio group assignments.
///
/// Assignments are stored in `stitch.config.json` next to the `.yyp`. The
/// most specific assigned folder of a sprite or sound decides its group.
#[derive(Debug, Args)]
pub struct GroupsCommand {
    #[command(subcommand)]
    pub command: GroupsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsSubcommand {
    /// Assign the sprites in a folder to a texture group
    AssignTexture {
        /// IDE folder, e.g. `Sprites/UI`
        folder: String,
        /// Texture group name; created when missing
        group: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Assign the sounds in a folder to an audio group
    AssignAudio {
        /// IDE folder, e.g. `Sounds/Music`
        folder: String,
        /// Audio group name; created when missing
        group: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Reapply every stored assignment
    Apply {
        #[command(flatten)]
        target: TargetArgs,
    },
}

impl GroupsCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let updated = match self.command {
            GroupsSubcommand::AssignTexture { folder, group, target } => {
                ctx.open_target(&target.target)?.add_texture_group_assignment(&folder, &group)?
            }
            GroupsSubcommand::AssignAudio { folder, group, target } => {
                ctx.open_target(&target.target)?.add_audio_group_assignment(&folder, &group)?
            }
            GroupsSubcommand::Apply { target } => {
                let mut project = ctx.open_target(&target.target)?;
                let updated = project.ensure_group_assignments()?;
                project.save()?;
                updated
            }
        };
        println!("{} {} resource(s) changed group", "✓".green(), updated);
        Ok(())
    }
}
