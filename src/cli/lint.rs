use super::common::{CommandContext, OutputFormat, TargetArgs, print_report};
use crate::lint::{LintOptions, LintReport, Linter};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Report unreferenced global functions and outdated versioned calls.
///
/// Exits with status 1 when anything is found.
#[derive(Debug, Args)]
pub struct LintCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Regex for version suffixes, e.g. `(_v\d+)?`; enables outdated reference checks
    #[arg(long = "suffix", value_name = "REGEX")]
    pub version_suffix: Option<String>,

    /// Only lint these functions
    #[arg(long = "function", value_name = "NAME")]
    pub functions: Vec<String>,

    /// Only lint functions whose name matches this regex
    #[arg(long, value_name = "REGEX", conflicts_with = "functions")]
    pub allow: Option<String>,

    /// Skip functions whose name matches this regex
    #[arg(long, value_name = "REGEX", conflicts_with_all = ["functions", "allow"])]
    pub exclude: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl LintCommand {
    fn options(&self, ctx: &CommandContext) -> LintOptions {
        LintOptions {
            version_suffix: self.version_suffix.clone().or_else(|| ctx.config.lint.version_suffix.clone()),
            functions: (!self.functions.is_empty()).then(|| self.functions.clone()),
            allow_name_pattern: self.allow.clone(),
            exclude_name_pattern: self.exclude.clone(),
        }
    }

    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let project = ctx.open_read_only(&self.target.target)?;
        let report = Linter::new(&project, self.options(ctx)).run()?;
        print_report(self.format, &report, LintReport::render)?;
        if !report.is_clean() {
            std::process::exit(1);
        }
        if self.format == OutputFormat::Text {
            println!("{} No lint issues found", "✓".green());
        }
        Ok(())
    }
}
