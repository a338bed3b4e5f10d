//! `stitch merge`: copy a pattern-selected scope of another project.

use super::common::{CommandContext, OutputFormat, TargetArgs, print_report};
use crate::core::ResourceKind;
use crate::merge::{ClobberPolicy, MergeOptions, MergeReport, ProjectMerger};
use anyhow::Result;
use clap::Args;
use tracing::debug;

/// Merge resources from a source project into the target.
///
/// Resources whose folder matches any `--if-folder-matches` pattern, or whose
/// name matches any `--if-name-matches` pattern, are copied. Without patterns
/// every resource is copied.
#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Source project: a path or an alias from the `[sources]` config table
    #[arg(value_name = "SOURCE")]
    pub source: String,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Case-insensitive regex matched against resource folders
    #[arg(long = "if-folder-matches", value_name = "REGEX")]
    pub folder_patterns: Vec<String>,

    /// Case-insensitive regex matched against resource names
    #[arg(long = "if-name-matches", value_name = "REGEX")]
    pub name_patterns: Vec<String>,

    /// Only merge these kinds (script, sprite, object, ...)
    #[arg(long = "types", value_name = "KIND")]
    pub kinds: Vec<ResourceKind>,

    /// Allow object parents and sprites outside the merge
    #[arg(long)]
    pub skip_dependency_check: bool,

    /// Leave included files alone
    #[arg(long)]
    pub skip_included_files: bool,

    /// Move target resources that match but are missing from the source into MERGE_CONFLICTS
    #[arg(long)]
    pub move_conflicting: bool,

    /// What to do when an incoming resource collides with one outside the merge scope
    #[arg(long, value_enum)]
    pub on_clobber: Option<ClobberPolicy>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl MergeCommand {
    /// Options from flags, falling back to the `[merge]` config table.
    pub fn options(&self, ctx: &CommandContext) -> Result<MergeOptions> {
        let mut builder = ctx.config.merge.apply_to(MergeOptions::builder());
        builder = builder
            .folder_patterns(self.folder_patterns.iter().cloned())
            .name_patterns(self.name_patterns.iter().cloned())
            .kinds(self.kinds.iter().copied());
        if self.skip_dependency_check {
            builder = builder.check_dependencies(false);
        }
        if self.skip_included_files {
            builder = builder.include_included_files(false);
        }
        if self.move_conflicting {
            builder = builder.move_conflicting(true);
        }
        if let Some(policy) = self.on_clobber {
            builder = builder.on_clobber(policy);
        }
        Ok(builder.build()?)
    }

    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let options = self.options(ctx)?;
        debug!("Merge options: {:?}", options);
        let source = ctx.open_source(&self.source).await?;
        let mut target = ctx.open_target(&self.target.target)?;
        let report = ProjectMerger::new(&source, &mut target, &options).run()?;
        print_report(self.format, &report, MergeReport::render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        merge: MergeCommand,
    }

    #[test]
    fn test_flags_override_config_defaults() -> Result<()> {
        let mut config = GlobalConfig::default();
        config.merge.on_clobber = Some(ClobberPolicy::Skip);
        config.merge.move_conflicting = Some(true);
        let ctx = CommandContext {
            config,
            allow_dirty: true,
        };

        let harness = Harness::try_parse_from(["merge", "../Lib", "--on-clobber", "error", "--types", "scripts"])?;
        let options = harness.merge.options(&ctx)?;
        assert_eq!(options.on_clobber(), ClobberPolicy::Error);
        assert!(options.move_conflicting());
        assert_eq!(options.kinds(), &[ResourceKind::Script]);

        let harness = Harness::try_parse_from(["merge", "../Lib", "--if-name-matches", "("])?;
        assert!(harness.merge.options(&ctx).is_err());
        Ok(())
    }
}
