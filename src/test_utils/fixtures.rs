//! On-disk GameMaker project fixtures.
//!
//! [`ProjectFixture`] writes a minimal but valid project into a temporary
//! directory and offers helpers to drop resources, included files and images
//! into it. Helpers write directly with `std::fs` so they never count against
//! the [`Storage`] write counter of the project under test.

use crate::constants::{DATAFILES_DIR, DEFAULT_AUDIO_GROUP, DEFAULT_GROUP_TARGETS, DEFAULT_TEXTURE_GROUP};
use crate::core::ResourceKind;
use crate::project::{Project, ProjectOptions};
use crate::resources::{RawResource, ResourceContext, ResourceRef, codec};
use crate::storage::Storage;
use crate::utils::{folder_hierarchy, normalize_folder};
use crate::yy;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name of the fixture's project descriptor.
pub const FIXTURE_YYP: &str = "fixture.yyp";

/// A throwaway GameMaker project on disk.
pub struct ProjectFixture {
    dir: TempDir,
    storage: Storage,
}

impl ProjectFixture {
    /// Create an empty project with the default config and groups.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create fixture directory")?;
        let fixture = Self {
            dir,
            storage: Storage::new(false, true),
        };
        fixture.write_yyp(&empty_yyp("fixture"))?;
        Ok(fixture)
    }

    /// Project directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the `.yyp` file.
    #[must_use]
    pub fn yyp_path(&self) -> PathBuf {
        self.path().join(FIXTURE_YYP)
    }

    /// Resource context sharing one storage across calls.
    #[must_use]
    pub fn context(&self) -> ResourceContext {
        ResourceContext::new(self.path(), self.storage.clone())
    }

    /// Load the fixture as a writable project.
    pub fn load(&self) -> Result<Project> {
        Project::load(
            self.path(),
            ProjectOptions {
                read_only: false,
                allow_dirty: true,
            },
        )
    }

    /// Parsed `.yyp` as it is on disk.
    pub fn read_yyp(&self) -> Result<Value> {
        let text = fs::read_to_string(self.yyp_path())?;
        Ok(yy::parse(&text)?)
    }

    /// Overwrite the `.yyp`.
    pub fn write_yyp(&self, yyp: &Value) -> Result<()> {
        fs::write(self.yyp_path(), yy::stringify(yyp))?;
        Ok(())
    }

    /// Write a file relative to the project directory.
    pub fn write_file(&self, relative: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a solid PNG of the given size.
    pub fn write_png(&self, relative: &str, width: u32, height: u32) -> Result<PathBuf> {
        self.write_png_with_shade(relative, width, height, 0)
    }

    fn write_png_with_shade(&self, relative: &str, width: u32, height: u32, shade: u8) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([shade, 64, 128, 255]));
        img.save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `count` distinct PNG frames (`frame_0.png`, ...) into a directory.
    pub fn write_png_frames(&self, relative_dir: &str, count: usize, width: u32, height: u32) -> Result<PathBuf> {
        for i in 0..count {
            let shade = u8::try_from(i * 40 % 256).unwrap_or(0);
            self.write_png_with_shade(&format!("{relative_dir}/frame_{i}.png"), width, height, shade)?;
        }
        Ok(self.path().join(relative_dir))
    }

    /// Register a folder and its ancestors in the `.yyp`.
    pub fn add_folder(&self, folder: &str) -> Result<()> {
        let mut yyp = self.read_yyp()?;
        register_folder(&mut yyp, folder);
        self.write_yyp(&yyp)
    }

    /// Write a resource with a custom descriptor and register it.
    ///
    /// `name`, `resourceType` and `parent` are forced to match.
    pub fn add_resource_with(
        &self,
        kind: ResourceKind,
        name: &str,
        folder: &str,
        mut descriptor: Value,
    ) -> Result<RawResource> {
        let folder = normalize_folder(folder);
        if let Some(map) = descriptor.as_object_mut() {
            map.insert("name".into(), json!(name));
            map.insert("resourceType".into(), json!(kind.resource_type()));
            map.insert("parent".into(), ResourceRef::to_folder(&folder).to_value());
        }
        let raw = RawResource {
            id: ResourceRef::to_resource(kind, name),
            order: None,
        };
        self.write_file(&raw.id.path, yy::stringify(&descriptor).as_bytes())?;

        let mut yyp = self.read_yyp()?;
        register_folder(&mut yyp, &folder);
        if let Some(resources) = yyp.get_mut("resources").and_then(Value::as_array_mut) {
            resources.push(serde_json::to_value(&raw)?);
        }
        self.write_yyp(&yyp)?;
        Ok(raw)
    }

    /// Write a resource with the default descriptor for its kind.
    pub fn add_resource(&self, kind: ResourceKind, name: &str, folder: &str) -> Result<RawResource> {
        self.add_resource_with(kind, name, folder, codec::default_yy(kind, name))
    }

    /// Add a script with code.
    pub fn add_script(&self, name: &str, folder: &str, code: &str) -> Result<RawResource> {
        let raw = self.add_resource(ResourceKind::Script, name, folder)?;
        self.write_file(&format!("scripts/{name}/{name}.gml"), code.as_bytes())?;
        Ok(raw)
    }

    /// Add an object without parent or sprite.
    pub fn add_object(&self, name: &str, folder: &str) -> Result<RawResource> {
        self.add_object_with(name, folder, None, None)
    }

    /// Add an object referencing a parent object and a sprite.
    pub fn add_object_with(
        &self,
        name: &str,
        folder: &str,
        parent: Option<&str>,
        sprite: Option<&str>,
    ) -> Result<RawResource> {
        let mut descriptor = codec::default_yy(ResourceKind::Object, name);
        if let Some(parent) = parent {
            descriptor["parentObjectId"] = ResourceRef::to_resource(ResourceKind::Object, parent).to_value();
        }
        if let Some(sprite) = sprite {
            descriptor["spriteId"] = ResourceRef::to_resource(ResourceKind::Sprite, sprite).to_value();
        }
        self.add_resource_with(ResourceKind::Object, name, folder, descriptor)
    }

    /// Write an object event file.
    pub fn add_object_event(&self, object: &str, event: &str, code: &str) -> Result<PathBuf> {
        self.write_file(&format!("objects/{object}/{event}.gml"), code.as_bytes())
    }

    /// Add a sprite with one frame image.
    pub fn add_sprite(&self, name: &str, folder: &str) -> Result<RawResource> {
        let raw = self.add_resource(ResourceKind::Sprite, name, folder)?;
        self.write_png(&format!("sprites/{name}/{name}.png"), 4, 4)?;
        Ok(raw)
    }

    /// Add a sound with a small audio file and audio group.
    pub fn add_sound(&self, name: &str, folder: &str, audio_group: &str) -> Result<RawResource> {
        let mut descriptor = codec::default_yy(ResourceKind::Sound, name);
        descriptor["soundFile"] = json!(format!("{name}.wav"));
        descriptor["audioGroupId"] = json!({
            "name": audio_group,
            "path": format!("audiogroups/{audio_group}"),
        });
        let raw = self.add_resource_with(ResourceKind::Sound, name, folder, descriptor)?;
        self.write_file(&format!("sounds/{name}/{name}.wav"), b"RIFF0000WAVE")?;
        Ok(raw)
    }

    /// Add an included file under `datafiles/<directory>`.
    pub fn add_included_file(&self, name: &str, directory: &str, content: &[u8]) -> Result<PathBuf> {
        let directory = normalize_folder(directory);
        let file_path = if directory.is_empty() {
            DATAFILES_DIR.to_string()
        } else {
            format!("{DATAFILES_DIR}/{directory}")
        };
        let path = self.write_file(&format!("{file_path}/{name}"), content)?;
        let mut yyp = self.read_yyp()?;
        if let Some(files) = yyp.get_mut("IncludedFiles").and_then(Value::as_array_mut) {
            files.push(json!({
                "CopyToMask": -1,
                "filePath": file_path,
                "resourceVersion": "1.0",
                "name": name,
                "resourceType": "GMIncludedFile",
            }));
        }
        self.write_yyp(&yyp)?;
        Ok(path)
    }
}

fn register_folder(yyp: &mut Value, folder: &str) {
    let Some(folders) = yyp.get_mut("Folders").and_then(Value::as_array_mut) else {
        return;
    };
    for path in folder_hierarchy(folder) {
        let folder_path = format!("folders/{path}.yy");
        if folders.iter().any(|f| f["folderPath"] == folder_path.as_str()) {
            continue;
        }
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        folders.push(json!({
            "folderPath": folder_path,
            "order": folders.len(),
            "resourceVersion": "1.0",
            "name": name,
            "tags": [],
            "resourceType": "GMFolder",
        }));
    }
}

/// A project descriptor with nothing but the defaults.
#[must_use]
pub fn empty_yyp(name: &str) -> Value {
    json!({
        "resources": [],
        "Options": [],
        "isDnDProject": false,
        "isEcma": false,
        "tutorialPath": "",
        "configs": {"name": "Default", "children": []},
        "RoomOrderNodes": [],
        "Folders": [],
        "AudioGroups": [
            {
                "targets": DEFAULT_GROUP_TARGETS,
                "resourceVersion": "1.0",
                "name": DEFAULT_AUDIO_GROUP,
                "resourceType": "GMAudioGroup",
            },
        ],
        "TextureGroups": [
            {
                "isScaled": true,
                "autocrop": true,
                "border": 2,
                "mipsToGenerate": 0,
                "groupParent": null,
                "targets": DEFAULT_GROUP_TARGETS,
                "resourceVersion": "1.0",
                "name": DEFAULT_TEXTURE_GROUP,
                "resourceType": "GMTextureGroup",
            },
        ],
        "IncludedFiles": [],
        "MetaData": {"IDEVersion": "2.3.7.606"},
        "resourceVersion": "1.4",
        "name": name,
        "tags": [],
        "resourceType": "GMProject",
    })
}
