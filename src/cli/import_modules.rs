use super::common::{CommandContext, OutputFormat, TargetArgs, print_report};
use crate::merge::{MergeReport, ModuleImporter};
use anyhow::Result;
use clap::Args;

/// Import whole modules from a source project.
///
/// A module is every resource with a folder named after it anywhere in its
/// folder path, plus the included files under a directory of that name.
/// Target module resources missing from the source move to MODULE_CONFLICTS.
#[derive(Debug, Args)]
pub struct ImportModulesCommand {
    /// Source project: a path or an alias from the `[sources]` config table
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Module folder name; repeat for several modules
    #[arg(long = "module", short = 'm', value_name = "NAME", required = true)]
    pub modules: Vec<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ImportModulesCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let source = ctx.open_source(&self.source).await?;
        let mut target = ctx.open_target(&self.target.target)?;
        let report = ModuleImporter::new(&source, &mut target, self.modules).run()?;
        print_report(self.format, &report, MergeReport::render)
    }
}
