use super::{Payload, Resource, ResourceRef};
use crate::core::ResourceKind;
use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use std::cell::OnceCell;
use std::path::PathBuf;

/// One `.gml` event file of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEvent {
    /// File stem, e.g. `Step_0` or `Collision_obj_wall`
    pub name: String,
    /// Event type, e.g. `Step`
    pub event_type: String,
    /// Event number or collision target, e.g. `0`
    pub subtype: String,
    /// Event source code
    pub code: String,
}

impl ObjectEvent {
    fn new(name: &str, code: String) -> Self {
        let (event_type, subtype) = name.split_once('_').unwrap_or((name, ""));
        Self {
            name: name.to_string(),
            event_type: event_type.to_string(),
            subtype: subtype.to_string(),
            code,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ObjectCache {
    events: OnceCell<Vec<ObjectEvent>>,
}

impl Resource {
    fn object_cache(&self) -> Result<&ObjectCache> {
        self.expect_kind(ResourceKind::Object)?;
        match &self.payload {
            Payload::Object(cache) => Ok(cache),
            _ => Err(anyhow!("Object {} has no event cache", self.name)),
        }
    }

    fn weak_ref_name(&self, field: &str) -> Option<String> {
        self.yy
            .get(field)
            .and_then(|r| r.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set_weak_ref(&mut self, field: &str, kind: ResourceKind, name: Option<&str>) -> Result<()> {
        let value = name.map_or(Value::Null, |n| ResourceRef::to_resource(kind, n).to_value());
        self.set_field(field, value);
        self.save()?;
        Ok(())
    }

    /// Name of the parent object, if any.
    pub fn parent_name(&self) -> Result<Option<String>> {
        self.expect_kind(ResourceKind::Object)?;
        Ok(self.weak_ref_name("parentObjectId"))
    }

    /// Set or clear the parent object and save.
    ///
    /// The parent is not required to exist.
    pub fn set_parent(&mut self, parent: Option<&str>) -> Result<()> {
        self.expect_kind(ResourceKind::Object)?;
        self.set_weak_ref("parentObjectId", ResourceKind::Object, parent)
    }

    /// Name of the object's sprite, if any.
    pub fn sprite_name(&self) -> Result<Option<String>> {
        self.expect_kind(ResourceKind::Object)?;
        Ok(self.weak_ref_name("spriteId"))
    }

    /// Set or clear the sprite and save.
    pub fn set_sprite(&mut self, sprite: Option<&str>) -> Result<()> {
        self.expect_kind(ResourceKind::Object)?;
        self.set_weak_ref("spriteId", ResourceKind::Sprite, sprite)
    }

    /// Event `.gml` files in the object directory, sorted.
    pub fn event_files(&self) -> Result<Vec<PathBuf>> {
        self.expect_kind(ResourceKind::Object)?;
        self.storage().list_files(&self.yy_dir(), false, Some(&["gml"]))
    }

    /// Every event with its code, read once and cached.
    pub fn events(&self) -> Result<&[ObjectEvent]> {
        let cache = self.object_cache()?;
        if let Some(events) = cache.events.get() {
            return Ok(events);
        }
        let mut events = Vec::new();
        for file in self.event_files()? {
            let Some(stem) = file.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            events.push(ObjectEvent::new(&stem, self.storage().read_text(&file)?));
        }
        Ok(cache.events.get_or_init(|| events))
    }

    /// Code of one event by file stem (`Create_0`).
    pub fn event_code(&self, event: &str) -> Result<Option<&str>> {
        Ok(self.events()?.iter().find(|e| e.name == event).map(|e| e.code.as_str()))
    }

    /// Write an event file. Cached events are dropped.
    pub fn set_event_code(&mut self, event: &str, code: &str) -> Result<bool> {
        self.expect_kind(ResourceKind::Object)?;
        let path = self.data_file_path("gml", Some(event));
        let changed = self.storage().write_text(&path, code)?;
        self.invalidate_caches();
        Ok(changed)
    }
}
