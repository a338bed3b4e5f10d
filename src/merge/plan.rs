//! Planning pass of the merge engine.
//!
//! Planning reads both projects and decides what to do with every in-scope
//! resource and included file without touching the disk. Every consistency
//! error is raised here, so a plan that comes back `Ok` can be applied
//! without aborting halfway.

use super::options::{ClobberPolicy, MergeOptions};
use crate::constants::MERGE_CONFLICTS_FOLDER;
use crate::core::{ResourceKind, StitchError};
use crate::project::{IncludedFile, Project};
use crate::resources::Resource;
use anyhow::Result;
use std::collections::HashSet;
use tracing::debug;

/// What happens to one source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Nothing by that name in the target yet
    Add,
    /// Copy over the target's files
    Replace,
    /// Leave the target untouched
    Skip,
}

/// Decisions for one merge or module import.
#[derive(Debug)]
pub(crate) struct MergePlan<'s> {
    pub resources: Vec<(&'s Resource, Action)>,
    pub files: Vec<(&'s IncludedFile, Action)>,
    /// Target resources to move into `conflicts_folder`
    pub orphans: Vec<(String, ResourceKind)>,
    pub conflicts_folder: &'static str,
    pub warnings: Vec<String>,
}

impl<'s> MergePlan<'s> {
    pub(crate) fn new(conflicts_folder: &'static str) -> Self {
        Self {
            resources: Vec::new(),
            files: Vec::new(),
            orphans: Vec::new(),
            conflicts_folder,
            warnings: Vec::new(),
        }
    }
}

/// Object parents and sprites must be part of the same merge.
fn check_dependencies(in_scope: &[&Resource]) -> Result<()> {
    let present: HashSet<(&str, ResourceKind)> = in_scope.iter().map(|r| (r.name(), r.kind())).collect();
    for object in in_scope.iter().filter(|r| r.kind() == ResourceKind::Object) {
        let dependencies = [
            ("Parent", object.parent_name()?, ResourceKind::Object),
            ("Sprite", object.sprite_name()?, ResourceKind::Sprite),
        ];
        for (relation, dependency, kind) in dependencies {
            if let Some(dependency) = dependency
                && !present.contains(&(dependency.as_str(), kind))
            {
                return Err(StitchError::MissingDependency {
                    relation: relation.to_string(),
                    dependency,
                    object: object.name().to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn plan_resources<'s>(
    plan: &mut MergePlan<'s>,
    in_scope: &[&'s Resource],
    target: &Project,
    options: &MergeOptions,
) -> Result<()> {
    for &incoming in in_scope {
        let Some(existing) = target.resources().find_by_name(incoming.name(), None)? else {
            plan.resources.push((incoming, Action::Add));
            continue;
        };
        if existing.kind() != incoming.kind() {
            return Err(StitchError::KindConflict {
                name: incoming.name().to_string(),
                expected: incoming.kind().to_string(),
                found: existing.kind().to_string(),
            }
            .into());
        }
        if options.matches_resource(existing) {
            plan.resources.push((incoming, Action::Replace));
            continue;
        }
        let outside = format!("Target {} {} does not match the merge pattern", existing.kind(), existing.name());
        match options.on_clobber() {
            ClobberPolicy::Overwrite => {
                plan.warnings.push(format!("{outside}; it will be replaced"));
                plan.resources.push((incoming, Action::Replace));
            }
            ClobberPolicy::Skip => {
                plan.warnings.push(format!("{outside}; import skipped"));
                plan.resources.push((incoming, Action::Skip));
            }
            ClobberPolicy::Error => {
                return Err(StitchError::ClobberConflict {
                    name: existing.name().to_string(),
                    kind: existing.kind().to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn plan_files<'s>(plan: &mut MergePlan<'s>, source: &'s Project, target: &Project, options: &MergeOptions) -> Result<()> {
    let in_scope: Vec<&IncludedFile> = source.included_files().iter().filter(|f| options.matches_file(f)).collect();

    if options.move_conflicting() {
        let incoming: HashSet<&str> = in_scope.iter().map(|f| f.name()).collect();
        let extra: Vec<String> = target
            .included_files()
            .iter()
            .filter(|f| options.matches_file(f) && !incoming.contains(f.name()))
            .map(|f| f.name().to_string())
            .collect();
        if !extra.is_empty() {
            return Err(StitchError::IncludedFileConflict {
                names: extra,
                reason: "target files match the merge pattern but are not in the source".to_string(),
            }
            .into());
        }
    }

    for file in in_scope {
        let Some(existing) = target.find_included_file(file.name()) else {
            plan.files.push((file, Action::Add));
            continue;
        };
        if options.matches_file(existing) {
            plan.files.push((file, Action::Replace));
            continue;
        }
        match options.on_clobber() {
            ClobberPolicy::Overwrite => {
                plan.warnings.push(format!(
                    "Included file {} does not match the merge pattern; it will be replaced",
                    existing.relative_path()
                ));
                plan.files.push((file, Action::Replace));
            }
            ClobberPolicy::Skip => {
                plan.warnings.push(format!(
                    "Included file {} does not match the merge pattern; import skipped",
                    existing.relative_path()
                ));
                plan.files.push((file, Action::Skip));
            }
            ClobberPolicy::Error => {
                return Err(StitchError::IncludedFileConflict {
                    names: vec![file.name().to_string()],
                    reason: "a target file with this name does not match the merge pattern".to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Decide every action of a pattern merge from `source` into `target`.
pub(crate) fn plan_merge<'s>(source: &'s Project, target: &Project, options: &MergeOptions) -> Result<MergePlan<'s>> {
    let mut plan = MergePlan::new(MERGE_CONFLICTS_FOLDER);
    let in_scope: Vec<&Resource> = source.resources().iter().filter(|r| options.matches_resource(r)).collect();
    debug!("{} source resource(s) in scope", in_scope.len());

    if options.check_dependencies() {
        check_dependencies(&in_scope)?;
    }

    let incoming: HashSet<(&str, ResourceKind)> = in_scope.iter().map(|r| (r.name(), r.kind())).collect();
    for orphan in target
        .resources()
        .iter()
        .filter(|r| options.matches_resource(r) && !incoming.contains(&(r.name(), r.kind())))
    {
        if options.move_conflicting() {
            plan.orphans.push((orphan.name().to_string(), orphan.kind()));
        } else {
            plan.warnings.push(format!(
                "Target {} {} matches the merge pattern but is not in the source; it was left alone",
                orphan.kind(),
                orphan.name()
            ));
        }
    }

    plan_resources(&mut plan, &in_scope, target, options)?;
    if options.include_included_files() {
        plan_files(&mut plan, source, target, options)?;
    }
    Ok(plan)
}
