//! Merging resources between GameMaker projects.
//!
//! A merge copies the resources of a source project that match a scope into
//! a target project. The scope is given by [`MergeOptions`]: folder and name
//! patterns (either one matching puts a resource in scope) and an optional
//! kind whitelist.
//!
//! Every merge runs in two phases:
//!
//! 1. **Plan**. Both projects are read and every decision is made: which
//!    resources are added, replaced or skipped, which target resources are
//!    orphans, which included files move. Missing dependencies, name clashes
//!    across kinds and clobber violations are raised here, before any write.
//! 2. **Apply**. Orphans are relocated, files are copied, groups and configs
//!    referenced by the result are created, and the `.yyp` is saved.
//!
//! Copies skip files whose content is already identical, so running the
//! same merge twice writes nothing the second time.
//!
//! [`ModuleImporter`] is the stricter variant scoped to module folders.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stitch_cli::merge::{ClobberPolicy, MergeOptions};
//! use stitch_cli::project::{Project, ProjectOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = Project::load("../SharedLib", ProjectOptions { read_only: true, allow_dirty: true })?;
//! let mut target = Project::load(".", ProjectOptions::default())?;
//!
//! let options = MergeOptions::builder()
//!     .if_folder_matches("^Libraries/Pack")
//!     .move_conflicting(true)
//!     .on_clobber(ClobberPolicy::Error)
//!     .build()?;
//! let report = target.merge_from(&source, &options)?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```

mod apply;
mod modules;
mod options;
mod plan;
mod report;

pub use modules::ModuleImporter;
pub use options::{ClobberPolicy, MergeOptions, MergeOptionsBuilder};
pub use report::MergeReport;

use crate::core::StitchError;
use crate::project::Project;
use anyhow::Result;
use tracing::info;

/// Refuse to plan against a project that cannot be written.
fn ensure_writable(target: &Project) -> Result<()> {
    if target.storage().is_read_only() {
        return Err(StitchError::ReadOnly {
            path: target.yyp_path().display().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Merges a scope of one project into another.
pub struct ProjectMerger<'a> {
    source: &'a Project,
    target: &'a mut Project,
    options: &'a MergeOptions,
}

impl<'a> ProjectMerger<'a> {
    /// Merge from `source` into `target`. The source is never written.
    pub fn new(source: &'a Project, target: &'a mut Project, options: &'a MergeOptions) -> Self {
        Self {
            source,
            target,
            options,
        }
    }

    /// Plan, then apply.
    ///
    /// # Errors
    ///
    /// Consistency errors ([`StitchError::MissingDependency`],
    /// [`StitchError::KindConflict`], [`StitchError::ClobberConflict`],
    /// [`StitchError::IncludedFileConflict`], [`StitchError::NameCaseMismatch`])
    /// leave the target untouched. Storage errors during the apply phase are
    /// propagated as they occur.
    pub fn run(self) -> Result<MergeReport> {
        ensure_writable(self.target)?;
        info!("Merging {} into {}", self.source.dir().display(), self.target.dir().display());
        let plan = plan::plan_merge(self.source, self.target, self.options)?;
        let report = apply::apply(plan, self.source, self.target)?;
        info!("Merge complete");
        Ok(report)
    }
}

impl Project {
    /// Merge the resources of `source` selected by `options` into this project.
    pub fn merge_from(&mut self, source: &Project, options: &MergeOptions) -> Result<MergeReport> {
        ProjectMerger::new(source, self, options).run()
    }

    /// Import whole modules from `source` into this project.
    pub fn import_modules(&mut self, source: &Project, modules: &[String]) -> Result<MergeReport> {
        ModuleImporter::new(source, self, modules.iter().cloned()).run()
    }
}
