use super::Project;
use crate::constants::DATAFILES_DIR;
use crate::core::StitchError;
use crate::resources::path_has_module;
use crate::utils::normalize_folder;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An included file (`IncludedFiles` entry). Names are unique project-wide.
///
/// Kept as the exact object found in the `.yyp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncludedFile(Map<String, Value>);

impl IncludedFile {
    /// A new entry for `name` in `datafiles/<directory>`.
    #[must_use]
    pub fn new(name: &str, directory: &str) -> Self {
        let directory = normalize_folder(directory);
        let file_path = if directory.is_empty() {
            DATAFILES_DIR.to_string()
        } else {
            format!("{DATAFILES_DIR}/{directory}")
        };
        match json!({
            "CopyToMask": -1,
            "filePath": file_path,
            "resourceVersion": "1.0",
            "name": name,
            "resourceType": "GMIncludedFile",
        }) {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }

    /// File name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    /// Directory relative to the project, starting with `datafiles`.
    #[must_use]
    pub fn file_path(&self) -> &str {
        self.0.get("filePath").and_then(Value::as_str).unwrap_or(DATAFILES_DIR)
    }

    /// Per-config overrides, keyed by config name.
    #[must_use]
    pub fn config_values(&self) -> Option<&Map<String, Value>> {
        self.0.get("ConfigValues").and_then(Value::as_object)
    }

    /// The raw entry.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Directory below `datafiles`, empty for the root.
    #[must_use]
    pub fn directory(&self) -> &str {
        let file_path = self.file_path();
        let path = file_path.strip_prefix(DATAFILES_DIR).unwrap_or(file_path);
        path.trim_start_matches('/')
    }

    /// Path of the content relative to the project (`datafiles/dir/name`).
    #[must_use]
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.file_path(), self.name())
    }

    /// Configs this file has overrides for.
    #[must_use]
    pub fn config_names(&self) -> Vec<String> {
        self.config_values()
            .map(|configs| configs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether any directory segment equals `module`, ignoring case.
    #[must_use]
    pub fn is_in_module(&self, module: &str) -> bool {
        path_has_module(self.directory(), module)
    }
}

impl Project {
    /// Every included file.
    #[must_use]
    pub fn included_files(&self) -> &[IncludedFile] {
        &self.included_files
    }

    /// Find an included file by exact name.
    #[must_use]
    pub fn find_included_file(&self, name: &str) -> Option<&IncludedFile> {
        self.included_files.iter().find(|f| f.name() == name)
    }

    /// Copy an included file's entry and content from another project.
    ///
    /// The entry is carried over whole, so `CopyToMask`, per-config values
    /// and any newer fields are kept. Saves the `.yyp`.
    pub fn import_included_file(&mut self, source: &Project, file: &IncludedFile) -> Result<()> {
        self.storage().copy_file(&source.included_file_path(file), &self.included_file_path(file))?;
        match self.included_files.iter_mut().find(|f| f.name() == file.name()) {
            Some(existing) => existing.clone_from(file),
            None => self.included_files.push(file.clone()),
        }
        info!("Added included file {}", file.relative_path());
        self.save()?;
        Ok(())
    }

    /// Absolute path of an included file's content.
    #[must_use]
    pub fn included_file_path(&self, file: &IncludedFile) -> PathBuf {
        self.ctx.resolve(&file.relative_path())
    }

    fn require_included_file(&self, name: &str) -> Result<&IncludedFile> {
        self.find_included_file(name).ok_or_else(|| {
            StitchError::FileNotFound {
                path: format!("{DATAFILES_DIR}/**/{name}"),
            }
            .into()
        })
    }

    /// Content of an included file.
    pub fn included_file_content(&self, name: &str) -> Result<Vec<u8>> {
        let file = self.require_included_file(name)?;
        self.storage().read_blob(&self.included_file_path(file))
    }

    /// Replace an included file's content with an external file.
    ///
    /// Returns whether the content changed.
    pub fn replace_included_file_content(&mut self, name: &str, source: &Path) -> Result<bool> {
        let path = self.included_file_path(self.require_included_file(name)?);
        let changed = self.storage().copy_file(source, &path)?;
        if changed {
            debug!("Replaced content of included file {}", name);
        }
        Ok(changed)
    }

    /// Add an included file from an external file, or replace its content
    /// when a file with the same name exists in any directory.
    ///
    /// Saves the `.yyp`. Returns whether a new entry was created.
    pub fn add_included_file(&mut self, source: &Path, directory: &str) -> Result<bool> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("{} has no file name", source.display()))?;
        if self.find_included_file(&name).is_some() {
            self.replace_included_file_content(&name, source)?;
            self.save()?;
            return Ok(false);
        }
        let file = IncludedFile::new(&name, directory);
        self.storage().copy_file(source, &self.included_file_path(&file))?;
        info!("Added included file {}", file.relative_path());
        self.included_files.push(file);
        self.save()?;
        Ok(true)
    }
}
