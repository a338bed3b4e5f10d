//! Module import: a merge scoped to named module folders.
//!
//! A resource belongs to module `Pack` when any segment of its folder path is
//! `Pack`, ignoring case; an included file when any segment of its directory
//! below `datafiles` is. Unlike a pattern merge, conflicts are never
//! negotiable:
//!
//! - target module resources missing from the source module always move to
//!   `MODULE_CONFLICTS`;
//! - a same-named target resource outside the module, or of another kind,
//!   aborts the import;
//! - so does a same-named included file outside the module, and any target
//!   module included file missing from the source module.
//!
//! All requested modules are planned together before anything is written.

use super::apply::apply;
use super::plan::{Action, MergePlan};
use super::report::MergeReport;
use crate::constants::MODULE_CONFLICTS_FOLDER;
use crate::core::StitchError;
use crate::project::{IncludedFile, Project};
use crate::resources::Resource;
use anyhow::Result;
use std::collections::HashSet;
use tracing::info;

/// The first of `modules` that `in_module` accepts.
fn module_of<'m>(modules: &'m [String], in_module: impl Fn(&str) -> bool) -> Option<&'m str> {
    modules.iter().map(String::as_str).find(|module| in_module(module))
}

fn plan_module_resources<'s>(
    plan: &mut MergePlan<'s>,
    modules: &[String],
    source: &'s Project,
    target: &Project,
) -> Result<()> {
    let incoming: Vec<(&'s Resource, &str)> = source
        .resources()
        .iter()
        .filter_map(|r| module_of(modules, |m| r.is_in_module(m)).map(|m| (r, m)))
        .collect();

    for module in modules {
        let names: HashSet<&str> = incoming
            .iter()
            .filter(|(r, _)| r.is_in_module(module))
            .map(|(r, _)| r.name())
            .collect();
        for alien in target
            .resources()
            .iter()
            .filter(|r| r.is_in_module(module) && !names.contains(r.name()))
        {
            let key = (alien.name().to_string(), alien.kind());
            if !plan.orphans.contains(&key) {
                plan.orphans.push(key);
            }
        }
    }

    for (resource, module) in incoming {
        let Some(existing) = target.resources().find_by_name(resource.name(), None)? else {
            plan.resources.push((resource, Action::Add));
            continue;
        };
        if !existing.is_in_module(module) {
            return Err(StitchError::ModuleConflict {
                name: existing.name().to_string(),
                module: module.to_string(),
            }
            .into());
        }
        if existing.kind() != resource.kind() {
            return Err(StitchError::KindConflict {
                name: resource.name().to_string(),
                expected: resource.kind().to_string(),
                found: existing.kind().to_string(),
            }
            .into());
        }
        plan.resources.push((resource, Action::Replace));
    }
    Ok(())
}

fn plan_module_files<'s>(
    plan: &mut MergePlan<'s>,
    modules: &[String],
    source: &'s Project,
    target: &Project,
) -> Result<()> {
    let incoming: Vec<(&'s IncludedFile, &str)> = source
        .included_files()
        .iter()
        .filter_map(|f| module_of(modules, |m| f.is_in_module(m)).map(|m| (f, m)))
        .collect();

    let names: HashSet<&str> = incoming.iter().map(|(f, _)| f.name()).collect();
    let extra: Vec<String> = target
        .included_files()
        .iter()
        .filter(|f| module_of(modules, |m| f.is_in_module(m)).is_some() && !names.contains(f.name()))
        .map(|f| f.name().to_string())
        .collect();
    if !extra.is_empty() {
        return Err(StitchError::IncludedFileConflict {
            names: extra,
            reason: "these files are in the target module but not in the source module".to_string(),
        }
        .into());
    }

    for (file, module) in incoming {
        match target.find_included_file(file.name()) {
            None => plan.files.push((file, Action::Add)),
            Some(existing) if existing.is_in_module(module) => plan.files.push((file, Action::Replace)),
            Some(existing) => {
                return Err(StitchError::IncludedFileConflict {
                    names: vec![existing.name().to_string()],
                    reason: format!("a file with this name exists outside the {module} module"),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Decide every action of importing `modules` from `source` into `target`.
pub(crate) fn plan_module_import<'s>(
    source: &'s Project,
    target: &Project,
    modules: &[String],
) -> Result<MergePlan<'s>> {
    if modules.is_empty() {
        return Err(StitchError::InvalidOption {
            option: "module".to_string(),
            reason: "at least one module name is required".to_string(),
        }
        .into());
    }
    if let Some(blank) = modules.iter().find(|m| m.trim().is_empty() || m.contains('/')) {
        return Err(StitchError::InvalidOption {
            option: "module".to_string(),
            reason: format!("'{blank}' is not a folder name"),
        }
        .into());
    }
    let mut plan = MergePlan::new(MODULE_CONFLICTS_FOLDER);
    plan_module_resources(&mut plan, modules, source, target)?;
    plan_module_files(&mut plan, modules, source, target)?;
    Ok(plan)
}

/// Imports whole modules from one project into another.
pub struct ModuleImporter<'a> {
    source: &'a Project,
    target: &'a mut Project,
    modules: Vec<String>,
}

impl<'a> ModuleImporter<'a> {
    /// Import `modules` from `source` into `target`.
    pub fn new<I, S>(source: &'a Project, target: &'a mut Project, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source,
            target,
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Plan every module, then apply the combined plan.
    pub fn run(self) -> Result<MergeReport> {
        super::ensure_writable(self.target)?;
        info!("Importing module(s) {} from {}", self.modules.join(", "), self.source.dir().display());
        let plan = plan_module_import(self.source, self.target, &self.modules)?;
        let report = apply(plan, self.source, self.target)?;
        info!("Module import complete");
        Ok(report)
    }
}
