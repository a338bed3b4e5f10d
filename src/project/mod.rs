//! The project aggregate: one `.yyp` file and everything it lists.
//!
//! [`Project::load`] finds the `.yyp`, checks the working tree guard, parses
//! the descriptor and hydrates resources, folders, configs, groups and
//! included files into typed collections. Fields of the `.yyp` that Stitch
//! does not model are kept verbatim and written back unchanged.
//!
//! Mutation comes in two flavors:
//!
//! - **Collection edits** ([`Project::add_folder`], [`Project::add_config`],
//!   [`Project::add_audio_group`], ...) change the in-memory model only and
//!   report whether anything was added. Call [`Project::save`] to persist.
//! - **Factories** ([`Project::add_script`], [`Project::add_sprite`], ...)
//!   write resource files immediately and save the `.yyp` before returning.
//!
//! Saving is checksum-aware: if the regenerated `.yyp` text equals what is on
//! disk, nothing is written.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stitch_cli::project::{Project, ProjectOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut project = Project::load("./MyGame", ProjectOptions::default())?;
//! project.add_script("scr_greet", "function greet(){ show_debug_message(\"hi\"); }")?;
//! println!("{} resources", project.resources().len());
//! # Ok(())
//! # }
//! ```

mod configs;
mod folders;
mod groups;
mod included_files;
mod settings;
mod version;

pub use configs::Config;
pub use folders::Folder;
pub use groups::{AudioGroup, TextureGroup};
pub use included_files::IncludedFile;
pub use settings::ProjectSettings;
pub use version::ProjectVersion;

use crate::constants::{NEW_RESOURCE_FOLDER, SOUND_EXTENSIONS};
use crate::core::{ResourceKind, StitchError};
use crate::resources::{
    RawResource, Resource, ResourceContext, ResourceRef, ResourceRegistry, SpriteType, validate_name,
};
use crate::storage::Storage;
use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a project is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectOptions {
    /// Refuse every write
    pub read_only: bool,
    /// Skip the clean working tree guard
    pub allow_dirty: bool,
}

/// A loaded GameMaker project.
#[derive(Debug)]
pub struct Project {
    yyp_path: PathBuf,
    raw: Map<String, Value>,
    ctx: ResourceContext,
    resources: ResourceRegistry,
    folders: Vec<Folder>,
    configs: Config,
    audio_groups: Vec<AudioGroup>,
    texture_groups: Vec<TextureGroup>,
    included_files: Vec<IncludedFile>,
    settings: ProjectSettings,
}

/// Locate the `.yyp` for a path that is either the file itself or its directory.
fn find_yyp(path: &Path, storage: &Storage) -> Result<PathBuf> {
    if path.is_file() {
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("yyp")) {
            return Ok(path.to_path_buf());
        }
        return Err(StitchError::ProjectNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let candidates = storage.list_files(path, false, Some(&["yyp"]))?;
    match candidates.as_slice() {
        [] => Err(StitchError::ProjectNotFound {
            path: path.display().to_string(),
        }
        .into()),
        [single] => Ok(single.clone()),
        many => Err(StitchError::MultipleProjectFiles {
            path: path.display().to_string(),
            files: many
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect(),
        }
        .into()),
    }
}

fn take_field<T: DeserializeOwned + Default>(raw: &Map<String, Value>, key: &str, yyp: &Path) -> Result<T> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            StitchError::InvalidProjectFile {
                path: yyp.display().to_string(),
                reason: format!("invalid {key}: {e}"),
            }
            .into()
        }),
    }
}

impl Project {
    /// Open a project from its `.yyp` or the directory holding it.
    pub fn load(path: impl AsRef<Path>, options: ProjectOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StitchError::ProjectNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let storage = Storage::new(options.read_only, options.allow_dirty);
        let yyp_path = find_yyp(path, &storage)?;
        let project_dir = yyp_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        storage.ensure_clean_working_tree(&project_dir)?;

        let raw = match storage.read_yy(&yyp_path)? {
            Value::Object(map) => map,
            _ => {
                return Err(StitchError::InvalidProjectFile {
                    path: yyp_path.display().to_string(),
                    reason: "the root is not an object".to_string(),
                }
                .into());
            }
        };
        if let Some(found) = raw.get("resourceType").and_then(Value::as_str)
            && found != "GMProject"
        {
            return Err(StitchError::InvalidProjectFile {
                path: yyp_path.display().to_string(),
                reason: format!("resourceType is {found}, not GMProject"),
            }
            .into());
        }

        let ctx = ResourceContext::new(&project_dir, storage);
        let raw_resources: Vec<RawResource> = take_field(&raw, "resources", &yyp_path)?;
        let resources = ResourceRegistry::hydrate(raw_resources, &ctx)
            .with_context(|| format!("Failed to load resources of {}", yyp_path.display()))?;
        let folders = take_field(&raw, "Folders", &yyp_path)?;
        let configs = take_field(&raw, "configs", &yyp_path)?;
        let audio_groups = take_field(&raw, "AudioGroups", &yyp_path)?;
        let texture_groups = take_field(&raw, "TextureGroups", &yyp_path)?;
        let included_files = take_field(&raw, "IncludedFiles", &yyp_path)?;
        let settings = ProjectSettings::load(&project_dir, ctx.storage())?;

        debug!("Loaded project {} with {} resources", yyp_path.display(), resources.len());
        Ok(Self {
            yyp_path,
            raw,
            ctx,
            resources,
            folders,
            configs,
            audio_groups,
            texture_groups,
            included_files,
            settings,
        })
    }

    /// Project name from the `.yyp`, falling back to the file stem.
    #[must_use]
    pub fn name(&self) -> String {
        self.raw
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.yyp_path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default()
    }

    /// Path of the `.yyp` file.
    #[must_use]
    pub fn yyp_path(&self) -> &Path {
        &self.yyp_path
    }

    /// Directory holding the `.yyp` file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.ctx.project_dir()
    }

    /// Storage shared by the project and its resources.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        self.ctx.storage()
    }

    pub(crate) fn ctx(&self) -> &ResourceContext {
        &self.ctx
    }

    /// The resource registry.
    #[must_use]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub(crate) fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    /// Look up a resource by exact name.
    pub fn resource(&self, name: &str) -> Result<Option<&Resource>> {
        self.resources.find_by_name(name, None)
    }

    /// Write the `.yyp`. Returns whether the file changed.
    pub fn save(&mut self) -> Result<bool> {
        let resources: Vec<Value> = self
            .resources
            .dehydrate()
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<_>>()?;
        self.raw.insert("resources".into(), Value::Array(resources));
        self.raw.insert("Folders".into(), serde_json::to_value(&self.folders)?);
        self.raw.insert("configs".into(), serde_json::to_value(&self.configs)?);
        self.raw.insert("AudioGroups".into(), serde_json::to_value(&self.audio_groups)?);
        self.raw.insert("TextureGroups".into(), serde_json::to_value(&self.texture_groups)?);
        self.raw.insert("IncludedFiles".into(), serde_json::to_value(&self.included_files)?);
        let changed = self.storage().write_yy(&self.yyp_path, &self.raw)?;
        if changed {
            debug!("Saved {}", self.yyp_path.display());
        }
        Ok(changed)
    }

    /// Find or create a resource of `kind`, returning it and whether it is new.
    ///
    /// New resources go into the `NEW` folder. A same-named resource of
    /// another kind is a [`StitchError::KindConflict`].
    fn upsert_resource(&mut self, kind: ResourceKind, name: &str) -> Result<(&mut Resource, bool)> {
        validate_name(name)?;
        let is_new = match self.resources.find_by_name(name, None)? {
            Some(existing) if existing.kind() != kind => {
                return Err(StitchError::KindConflict {
                    name: name.to_string(),
                    expected: kind.to_string(),
                    found: existing.kind().to_string(),
                }
                .into());
            }
            Some(_) => false,
            None => {
                self.add_folder(NEW_RESOURCE_FOLDER)?;
                let resource = Resource::create_default(kind, name, &self.ctx)?;
                self.resources.push(resource);
                info!("Created {} {}", kind, name);
                true
            }
        };
        let resource = self
            .resources
            .find_by_name_mut(name, Some(kind))?
            .ok_or_else(|| anyhow!("{kind} {name} vanished from the registry"))?;
        Ok((resource, is_new))
    }

    /// Add a script, or replace the code of an existing one.
    pub fn add_script(&mut self, name: &str, code: &str) -> Result<()> {
        self.upsert_resource(ResourceKind::Script, name)?.0.set_code(code)?;
        self.save()?;
        Ok(())
    }

    /// Add an object with default settings. An existing object is left as is.
    pub fn add_object(&mut self, name: &str) -> Result<()> {
        self.upsert_resource(ResourceKind::Object, name)?;
        self.save()?;
        Ok(())
    }

    /// Add a room with an instance layer.
    ///
    /// New rooms are appended to the room order when the project keeps one.
    pub fn add_room(&mut self, name: &str) -> Result<()> {
        let is_new = self.upsert_resource(ResourceKind::Room, name)?.1;
        if is_new && let Some(order) = self.raw.get_mut("RoomOrderNodes").and_then(Value::as_array_mut) {
            order.push(json!({"roomId": ResourceRef::to_resource(ResourceKind::Room, name).to_value()}));
        }
        self.save()?;
        Ok(())
    }

    /// Add a sound named after the audio file, or replace the file of an
    /// existing sound.
    pub fn add_sound(&mut self, audio_file: &Path) -> Result<()> {
        let extension = audio_file
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SOUND_EXTENSIONS.contains(&extension.as_str()) {
            return Err(StitchError::InvalidOption {
                option: "audio file".to_string(),
                reason: format!(
                    "cannot import {}; supported extensions are {}",
                    audio_file.display(),
                    SOUND_EXTENSIONS.join(", ")
                ),
            }
            .into());
        }
        let name = audio_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sound = self.upsert_resource(ResourceKind::Sound, &name)?.0;
        sound.replace_audio_file(audio_file)?;
        let group = sound.audio_group()?;
        self.add_audio_group(&group);
        self.save()?;
        Ok(())
    }

    /// Add or update a sprite from a directory of PNG frames, or from a
    /// Spine JSON export.
    pub fn add_sprite(&mut self, name: &str, source: &Path) -> Result<()> {
        let is_spine = source.is_file() && source.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let (sprite, is_new) = self.upsert_resource(ResourceKind::Sprite, name)?;
        if is_spine {
            if is_new {
                sprite.set_sprite_type(SpriteType::Spine)?;
            }
            sprite.sync_spine_source(source)?;
        } else {
            sprite.sync_from_image_dir(source, is_new)?;
        }
        let group = sprite.texture_group()?;
        self.add_texture_group(&group);
        self.save()?;
        Ok(())
    }

    /// Delete a resource's files and registry entry.
    ///
    /// Returns whether a resource by that name existed.
    pub fn delete_resource(&mut self, name: &str) -> Result<bool> {
        let Some(resource) = self.resources.remove(name)? else {
            return Ok(false);
        };
        resource.delete()?;
        self.save()?;
        info!("Deleted {} {}", resource.kind(), name);
        Ok(true)
    }

    /// Copy a resource's files from another project and register it here.
    ///
    /// The resource keeps its folder, which is added if missing. An existing
    /// entry with the same name is replaced. Returns how many files changed.
    pub(crate) fn clone_resource_from(&mut self, source: &Resource) -> Result<usize> {
        let folder = source.folder();
        if !folder.is_empty() {
            self.add_folder(&folder)?;
        }
        let dest = self.ctx.resolve(source.yy_dir_relative());
        let changed = self.storage().copy(&source.yy_dir(), &dest).with_context(|| {
            format!("Failed to copy {} {} into {}", source.kind(), source.name(), self.dir().display())
        })?;
        let resource = Resource::load(source.to_raw(), &self.ctx)?;
        self.resources.push(resource);
        Ok(changed)
    }
}
