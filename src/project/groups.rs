//! Audio and texture groups.
//!
//! Group entries are kept as the exact objects found in the `.yyp` so that
//! fields added by newer IDE versions survive untouched. New groups get the
//! defaults GameMaker writes.

use super::Project;
use crate::constants::DEFAULT_GROUP_TARGETS;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

macro_rules! group_entry {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(Map<String, Value>);

        impl $ty {
            /// Group name.
            #[must_use]
            pub fn name(&self) -> &str {
                self.0.get("name").and_then(Value::as_str).unwrap_or_default()
            }

            /// The raw entry.
            #[must_use]
            pub fn raw(&self) -> &Map<String, Value> {
                &self.0
            }
        }
    };
}

group_entry!(
    /// An `AudioGroups` entry.
    AudioGroup
);

group_entry!(
    /// A `TextureGroups` entry.
    TextureGroup
);

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl AudioGroup {
    /// A new group with GameMaker's defaults.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(into_map(json!({
            "targets": DEFAULT_GROUP_TARGETS,
            "resourceVersion": "1.0",
            "name": name,
            "resourceType": "GMAudioGroup",
        })))
    }
}

impl TextureGroup {
    /// A new group with GameMaker's defaults.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(into_map(json!({
            "isScaled": true,
            "autocrop": true,
            "border": 2,
            "mipsToGenerate": 0,
            "groupParent": null,
            "targets": DEFAULT_GROUP_TARGETS,
            "resourceVersion": "1.0",
            "name": name,
            "resourceType": "GMTextureGroup",
        })))
    }
}

impl Project {
    /// Every audio group.
    #[must_use]
    pub fn audio_groups(&self) -> &[AudioGroup] {
        &self.audio_groups
    }

    /// Every texture group.
    #[must_use]
    pub fn texture_groups(&self) -> &[TextureGroup] {
        &self.texture_groups
    }

    /// Ensure an audio group exists. Returns whether it was created.
    pub fn add_audio_group(&mut self, name: &str) -> bool {
        if name.is_empty() || self.audio_groups.iter().any(|g| g.name() == name) {
            return false;
        }
        info!("Adding audio group {}", name);
        self.audio_groups.push(AudioGroup::new(name));
        true
    }

    /// Ensure a texture group exists. Returns whether it was created.
    pub fn add_texture_group(&mut self, name: &str) -> bool {
        if name.is_empty() || self.texture_groups.iter().any(|g| g.name() == name) {
            return false;
        }
        info!("Adding texture group {}", name);
        self.texture_groups.push(TextureGroup::new(name));
        true
    }
}
