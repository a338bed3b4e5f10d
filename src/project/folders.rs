use super::Project;
use crate::core::StitchError;
use crate::utils::{folder_hierarchy, normalize_folder};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

/// A folder entry of the `.yyp` (`Folders` list).
///
/// Folders only exist in the IDE tree; nothing is created on disk. The entry
/// is kept as found so key order and newer fields survive a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Folder(Map<String, Value>);

impl Folder {
    /// A new folder entry for an IDE path such as `Sprites/UI`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        match json!({
            "folderPath": format!("folders/{path}.yy"),
            "order": 1,
            "resourceVersion": "1.0",
            "name": name,
            "tags": [],
            "resourceType": "GMFolder",
        }) {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    /// `folders/<path>.yy`
    #[must_use]
    pub fn folder_path(&self) -> &str {
        self.0.get("folderPath").and_then(Value::as_str).unwrap_or_default()
    }

    /// Path as shown in the IDE, without the `folders/` prefix and `.yy` suffix.
    #[must_use]
    pub fn path(&self) -> &str {
        let full = self.folder_path();
        let path = full.strip_prefix("folders/").unwrap_or(full);
        path.strip_suffix(".yy").unwrap_or(path)
    }

    /// The raw entry.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl Project {
    /// Every registered folder.
    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Whether a folder with exactly this path is registered.
    #[must_use]
    pub fn folder_exists(&self, path: &str) -> bool {
        let path = normalize_folder(path);
        self.folders.iter().any(|f| f.path() == path)
    }

    /// Register a folder and any missing ancestors.
    ///
    /// Returns whether anything was added.
    pub fn add_folder(&mut self, path: &str) -> Result<bool> {
        let hierarchy = folder_hierarchy(path);
        if hierarchy.is_empty() {
            return Err(StitchError::InvalidFolder {
                folder: path.to_string(),
            }
            .into());
        }
        let mut added = false;
        for sub_path in hierarchy {
            if !self.folder_exists(&sub_path) {
                debug!("Adding folder {}", sub_path);
                self.folders.push(Folder::new(&sub_path));
                added = true;
            }
        }
        Ok(added)
    }
}
