//! Per-project settings stored next to the `.yyp` in `stitch.config.json`.
//!
//! The file maps IDE folders to the texture and audio groups their sprites
//! and sounds belong to. The most specific folder wins, so `Sprites` can map
//! to one group while `Sprites/UI` maps to another.

use super::Project;
use crate::constants::PROJECT_CONFIG_FILE;
use crate::core::ResourceKind;
use crate::resources::Resource;
use crate::storage::Storage;
use crate::utils::normalize_folder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Contents of `stitch.config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Folder to texture group
    #[serde(default)]
    pub texture_group_assignments: BTreeMap<String, String>,
    /// Folder to audio group
    #[serde(default)]
    pub audio_group_assignments: BTreeMap<String, String>,
}

impl ProjectSettings {
    /// Read the settings of the project in `project_dir`. A missing file
    /// yields empty settings.
    pub fn load(project_dir: &Path, storage: &Storage) -> Result<Self> {
        let path = project_dir.join(PROJECT_CONFIG_FILE);
        if !storage.exists(&path) {
            return Ok(Self::default());
        }
        storage
            .read_yy_as(&path)
            .with_context(|| format!("Failed to read project settings: {}", path.display()))
    }

    /// Write the settings. Returns whether the file changed.
    pub fn save(&self, project_dir: &Path, storage: &Storage) -> Result<bool> {
        storage.write_yy(&project_dir.join(PROJECT_CONFIG_FILE), self)
    }
}

/// The group assigned to the most specific folder containing `resource`.
fn assigned_group<'a>(assignments: &'a BTreeMap<String, String>, resource: &Resource) -> Option<&'a str> {
    assignments
        .iter()
        .filter(|(folder, _)| resource.is_in_folder(folder, true))
        .max_by_key(|(folder, _)| folder.len())
        .map(|(_, group)| group.as_str())
}

impl Project {
    /// Project settings from `stitch.config.json`.
    #[must_use]
    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Assign the sprites in `folder` to a texture group, then reapply every
    /// assignment and save.
    pub fn add_texture_group_assignment(&mut self, folder: &str, group: &str) -> Result<usize> {
        self.settings
            .texture_group_assignments
            .insert(normalize_folder(folder), group.to_string());
        self.settings.save(self.ctx.project_dir(), self.ctx.storage())?;
        let updated = self.ensure_group_assignments()?;
        self.save()?;
        Ok(updated)
    }

    /// Assign the sounds in `folder` to an audio group, then reapply every
    /// assignment and save.
    pub fn add_audio_group_assignment(&mut self, folder: &str, group: &str) -> Result<usize> {
        self.settings
            .audio_group_assignments
            .insert(normalize_folder(folder), group.to_string());
        self.settings.save(self.ctx.project_dir(), self.ctx.storage())?;
        let updated = self.ensure_group_assignments()?;
        self.save()?;
        Ok(updated)
    }

    /// Create every assigned group and move sprites and sounds into the group
    /// of their most specific assigned folder.
    ///
    /// Changed resources are saved right away; the `.yyp` is not. Returns how
    /// many resources changed group.
    pub fn ensure_group_assignments(&mut self) -> Result<usize> {
        let texture_groups: Vec<String> = self.settings.texture_group_assignments.values().cloned().collect();
        for group in &texture_groups {
            self.add_texture_group(group);
        }
        let audio_groups: Vec<String> = self.settings.audio_group_assignments.values().cloned().collect();
        for group in &audio_groups {
            self.add_audio_group(group);
        }

        let mut updated = 0;
        for resource in self.resources.iter_mut() {
            match resource.kind() {
                ResourceKind::Sprite => {
                    let Some(group) = assigned_group(&self.settings.texture_group_assignments, resource) else {
                        continue;
                    };
                    if resource.texture_group()? != group {
                        debug!("Sprite {} -> texture group {}", resource.name(), group);
                        resource.set_texture_group(group)?;
                        updated += 1;
                    }
                }
                ResourceKind::Sound => {
                    let Some(group) = assigned_group(&self.settings.audio_group_assignments, resource) else {
                        continue;
                    };
                    if resource.audio_group()? != group {
                        debug!("Sound {} -> audio group {}", resource.name(), group);
                        resource.set_audio_group(group)?;
                        updated += 1;
                    }
                }
                _ => {}
            }
        }
        if updated > 0 {
            info!("Group assignments changed {} resource(s)", updated);
        }
        Ok(updated)
    }
}
