//! Apply pass of the merge engine.

use super::plan::{Action, MergePlan};
use super::report::MergeReport;
use crate::core::ResourceKind;
use crate::project::Project;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Carry out a plan against `target`, copying files from `source`.
///
/// Steps run in order: relocate orphans, add and replace resources, add and
/// replace included files, then make sure every group and config the target
/// references exists, and save.
pub(crate) fn apply(plan: MergePlan<'_>, source: &Project, target: &mut Project) -> Result<MergeReport> {
    let writes_before = target.storage().writes();
    let mut report = MergeReport {
        warnings: plan.warnings,
        ..MergeReport::default()
    };
    for warning in &report.warnings {
        warn!("{warning}");
    }

    if !plan.orphans.is_empty() {
        target.add_folder(plan.conflicts_folder)?;
        for (name, kind) in plan.orphans {
            if let Some(orphan) = target.resources_mut().find_by_name_mut(&name, Some(kind))? {
                orphan.set_folder(plan.conflicts_folder)?;
                info!("Moved {} {} into {}", kind, name, plan.conflicts_folder);
                report.relocated.push(name);
            }
        }
    }

    for (resource, action) in plan.resources {
        let name = resource.name().to_string();
        match action {
            Action::Add | Action::Replace => {
                let changed = target.clone_resource_from(resource)?;
                debug!("{} {}: {} file(s) changed", resource.kind(), name, changed);
                if action == Action::Add {
                    info!("Added {} {}", resource.kind(), name);
                    report.added.push(name);
                } else {
                    report.replaced.push(name);
                }
            }
            Action::Skip => report.skipped.push(name),
        }
    }

    for (file, action) in plan.files {
        match action {
            Action::Add => {
                target
                    .import_included_file(source, file)
                    .with_context(|| format!("Failed to add included file {}", file.relative_path()))?;
                for config in file.config_names() {
                    if target.add_config(&config) {
                        report.configs_created.push(config);
                    }
                }
                report.files_added.push(file.name().to_string());
            }
            Action::Replace => {
                target.replace_included_file_content(file.name(), &source.included_file_path(file))?;
                report.files_replaced.push(file.name().to_string());
            }
            Action::Skip => report.files_skipped.push(file.name().to_string()),
        }
    }

    target.ensure_group_assignments()?;
    let mut audio_groups = Vec::new();
    let mut texture_groups = Vec::new();
    let mut configs = Vec::new();
    for resource in target.resources() {
        match resource.kind() {
            ResourceKind::Sound => audio_groups.push(resource.audio_group()?),
            ResourceKind::Sprite => texture_groups.push(resource.texture_group()?),
            _ => {}
        }
        configs.extend(resource.config_names());
    }
    for group in audio_groups {
        if target.add_audio_group(&group) {
            report.groups_created.push(group);
        }
    }
    for group in texture_groups {
        if target.add_texture_group(&group) {
            report.groups_created.push(group);
        }
    }
    for config in configs {
        if target.add_config(&config) {
            report.configs_created.push(config);
        }
    }

    target.save()?;
    report.writes = target.storage().writes() - writes_before;
    Ok(report)
}
