//! In-memory model of project resources.
//!
//! A GameMaker project lists every asset in its `.yyp` file as a small raw
//! entry (`{"id": {"name", "path"}, "order"}`). The asset's real data lives in
//! a descriptor (`<root>/<name>/<name>.yy`) next to kind-specific companion
//! files: `.gml` code, frame images, audio files and so on.
//!
//! [`Resource`] is one common struct for every kind. It holds the raw entry
//! fields and the parsed descriptor, plus a small kind-specific payload for
//! the lazily computed caches scripts and objects need. Kind-specific
//! operations live in the per-kind modules as additional `impl Resource`
//! blocks and fail with [`StitchError::WrongKind`] when called on the wrong
//! kind.
//!
//! [`ResourceRegistry`] owns a project's resources and converts between raw
//! entries and hydrated resources through the per-kind [`codec`] table.

pub mod codec;
mod object;
mod registry;
mod room;
mod script;
mod sound;
mod sprite;

pub use object::ObjectEvent;
pub use registry::ResourceRegistry;
pub use sound::{SoundChannels, SoundCompression};
pub use sprite::SpriteType;

use crate::core::{ResourceKind, StitchError};
use crate::storage::Storage;
use crate::utils::normalize_folder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A `{name, path}` pair, the form GameMaker uses for every cross-reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Referenced name
    pub name: String,
    /// Project-relative path of the referenced item
    pub path: String,
}

impl ResourceRef {
    /// Reference to a resource's descriptor (`<root>/<name>/<name>.yy`).
    #[must_use]
    pub fn to_resource(kind: ResourceKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: format!("{}/{name}/{name}.yy", kind.root()),
        }
    }

    /// Reference to a folder (`folders/<path>.yy`).
    #[must_use]
    pub fn to_folder(folder: &str) -> Self {
        let name = folder.rsplit('/').next().unwrap_or(folder);
        Self {
            name: name.to_string(),
            path: format!("folders/{folder}.yy"),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({"name": self.name, "path": self.path})
    }
}

/// A resource entry as listed in the `.yyp` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResource {
    /// Name and descriptor path
    pub id: ResourceRef,
    /// Legacy ordering hint; newer projects omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Where a resource's files live and how to reach them.
#[derive(Debug, Clone)]
pub struct ResourceContext {
    project_dir: PathBuf,
    storage: Storage,
}

impl ResourceContext {
    /// Context for resources of the project rooted at `project_dir`.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>, storage: Storage) -> Self {
        Self {
            project_dir: project_dir.into(),
            storage,
        }
    }

    /// Directory holding the `.yyp` file.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Shared storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Absolute path of a project-relative, forward-slash path.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.project_dir.clone(), |path, segment| path.join(segment))
    }
}

/// Result of [`Resource::is_named`] when names match ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatch {
    /// Whether the names also match exactly
    pub exact: bool,
}

/// Lazily computed data that only some kinds need.
#[derive(Debug, Default)]
pub(crate) enum Payload {
    Script(script::ScriptCache),
    Object(object::ObjectCache),
    #[default]
    Plain,
}

/// One hydrated resource: raw entry fields, descriptor and caches.
#[derive(Debug)]
pub struct Resource {
    kind: ResourceKind,
    name: String,
    path: String,
    order: Option<i64>,
    yy: Value,
    ctx: ResourceContext,
    payload: Payload,
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.path == other.path
            && self.order == other.order
            && self.yy == other.yy
    }
}

impl Resource {
    /// Hydrate a raw `.yyp` entry by reading its descriptor.
    pub fn load(raw: RawResource, ctx: &ResourceContext) -> Result<Self> {
        let root = raw.id.path.split('/').next().unwrap_or_default();
        let kind = ResourceKind::from_root(root).ok_or_else(|| StitchError::UnknownResourceKind {
            name: raw.id.path.clone(),
        })?;
        let yy_path = ctx.resolve(&raw.id.path);
        let yy = ctx.storage().read_yy(&yy_path).with_context(|| {
            format!("Entry for {} in the project file does not have a readable .yy file", raw.id.name)
        })?;
        Ok(Self {
            kind,
            name: raw.id.name,
            path: raw.id.path,
            order: raw.order,
            yy,
            ctx: ctx.clone(),
            payload: codec::codec(kind).payload(),
        })
    }

    /// Create a new resource on disk with the given descriptor.
    ///
    /// The descriptor's `name` and `resourceType` are forced to match.
    pub fn create(
        kind: ResourceKind,
        name: &str,
        mut yy: Value,
        ctx: &ResourceContext,
    ) -> Result<Self> {
        validate_name(name)?;
        if let Some(map) = yy.as_object_mut() {
            map.insert("name".into(), json!(name));
            map.insert("resourceType".into(), json!(kind.resource_type()));
        }
        let resource = Self {
            kind,
            name: name.to_string(),
            path: ResourceRef::to_resource(kind, name).path,
            order: None,
            yy,
            ctx: ctx.clone(),
            payload: codec::codec(kind).payload(),
        };
        ctx.storage().ensure_dir(&resource.yy_dir())?;
        resource.save()?;
        debug!("Created {} {}", kind, name);
        Ok(resource)
    }

    /// Create a resource with the default descriptor for its kind.
    pub fn create_default(kind: ResourceKind, name: &str, ctx: &ResourceContext) -> Result<Self> {
        Self::create(kind, name, codec::default_yy(kind, name), ctx)
    }

    /// The raw `.yyp` entry for this resource.
    #[must_use]
    pub fn to_raw(&self) -> RawResource {
        RawResource {
            id: ResourceRef {
                name: self.name.clone(),
                path: self.path.clone(),
            },
            order: self.order,
        }
    }

    /// Kind of resource.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legacy ordering hint from the `.yyp`.
    #[must_use]
    pub const fn order(&self) -> Option<i64> {
        self.order
    }

    /// Parsed descriptor.
    #[must_use]
    pub const fn yy(&self) -> &Value {
        &self.yy
    }

    /// Mutable descriptor. Call [`Resource::save`] afterwards.
    pub fn yy_mut(&mut self) -> &mut Value {
        &mut self.yy
    }

    /// The `resourceType` tag in the descriptor.
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.yy.get("resourceType").and_then(Value::as_str)
    }

    pub(crate) fn ctx(&self) -> &ResourceContext {
        &self.ctx
    }

    pub(crate) fn storage(&self) -> &Storage {
        self.ctx.storage()
    }

    /// Descriptor path relative to the project (`sprites/x/x.yy`).
    #[must_use]
    pub fn yy_path_relative(&self) -> &str {
        &self.path
    }

    /// Resource directory relative to the project (`sprites/x`).
    #[must_use]
    pub fn yy_dir_relative(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Absolute descriptor path.
    #[must_use]
    pub fn yy_path(&self) -> PathBuf {
        self.ctx.resolve(&self.path)
    }

    /// Absolute resource directory.
    #[must_use]
    pub fn yy_dir(&self) -> PathBuf {
        self.ctx.resolve(self.yy_dir_relative())
    }

    /// Companion file next to the descriptor, named after the resource by default.
    #[must_use]
    pub fn data_file_path(&self, extension: &str, name: Option<&str>) -> PathBuf {
        self.yy_dir().join(format!("{}.{extension}", name.unwrap_or(&self.name)))
    }

    /// Every file and directory that makes up this resource.
    pub fn file_paths(&self) -> Result<Vec<PathBuf>> {
        self.storage().list_paths(&self.yy_dir(), true)
    }

    /// Folder shown in the IDE (`Sprites/UI`), without the `folders/` prefix.
    #[must_use]
    pub fn folder(&self) -> String {
        self.yy
            .pointer("/parent/path")
            .and_then(Value::as_str)
            .map(|path| {
                let path = path.strip_prefix("folders/").unwrap_or(path);
                path.strip_suffix(".yy").unwrap_or(path).to_string()
            })
            .unwrap_or_default()
    }

    /// Move this resource into another folder and save it.
    ///
    /// The folder must already be registered with the project for the IDE
    /// to show it.
    pub fn set_folder(&mut self, folder: &str) -> Result<()> {
        let normalized = normalize_folder(folder);
        if normalized.is_empty() {
            return Err(StitchError::InvalidFolder {
                folder: folder.to_string(),
            }
            .into());
        }
        self.set_field("parent", ResourceRef::to_folder(&normalized).to_value());
        self.save()?;
        Ok(())
    }

    /// Whether this resource is in `folder`, or below it when `recursive`.
    #[must_use]
    pub fn is_in_folder(&self, folder: &str, recursive: bool) -> bool {
        let target = folder.trim_end_matches('/');
        let own = self.folder();
        if own == target {
            return true;
        }
        if !recursive {
            return false;
        }
        target.is_empty() || own.strip_prefix(target).is_some_and(|rest| rest.starts_with('/'))
    }

    /// Whether any folder segment equals `module`, ignoring case.
    #[must_use]
    pub fn is_in_module(&self, module: &str) -> bool {
        path_has_module(&self.folder(), module)
    }

    /// Compare names ignoring case, reporting whether the match is exact.
    #[must_use]
    pub fn is_named(&self, name: &str) -> Option<NameMatch> {
        (self.name.to_lowercase() == name.to_lowercase()).then(|| NameMatch {
            exact: self.name == name,
        })
    }

    /// Names of the configurations with overrides for this resource.
    #[must_use]
    pub fn config_names(&self) -> Vec<String> {
        self.yy
            .get("ConfigValues")
            .and_then(Value::as_object)
            .map(|configs| configs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Write the descriptor. Returns whether the file changed.
    pub fn save(&self) -> Result<bool> {
        self.storage().write_yy(&self.yy_path(), &self.yy)
    }

    /// Delete the resource directory from disk.
    pub fn delete(&self) -> Result<()> {
        self.storage().delete_dir(&self.yy_dir())?;
        Ok(())
    }

    pub(crate) fn set_field(&mut self, key: &str, value: Value) {
        if let Some(map) = self.yy.as_object_mut() {
            map.insert(key.to_string(), value);
        }
    }

    pub(crate) fn expect_kind(&self, kind: ResourceKind) -> Result<()> {
        if self.kind != kind {
            return Err(StitchError::WrongKind {
                name: self.name.clone(),
                expected: kind.to_string(),
                found: self.kind.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn invalidate_caches(&mut self) {
        self.payload = codec::codec(self.kind).payload();
    }
}

/// Whether a slash-separated path has a segment equal to `module`, ignoring case.
pub(crate) fn path_has_module(path: &str, module: &str) -> bool {
    let module = module.to_lowercase();
    path.split('/').any(|segment| segment.to_lowercase() == module)
}

/// GameMaker resource names are identifiers: ASCII letters, digits and
/// underscores, not starting with a digit.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name cannot be empty")
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        Some("name cannot start with a digit")
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some("only letters, digits and underscores are allowed")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StitchError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}
