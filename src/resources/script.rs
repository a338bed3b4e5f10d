use super::{Payload, Resource};
use crate::core::ResourceKind;
use crate::parser::{GmlToken, find_outer_functions};
use anyhow::{Result, anyhow};
use std::cell::OnceCell;
use std::path::PathBuf;

/// Lazily loaded script text and the functions it declares.
#[derive(Debug, Default)]
pub(crate) struct ScriptCache {
    code: OnceCell<String>,
    functions: OnceCell<Vec<GmlToken>>,
}

impl Resource {
    /// Path of a script's `.gml` file.
    pub fn code_file_path(&self) -> Result<PathBuf> {
        self.expect_kind(ResourceKind::Script)?;
        Ok(self.data_file_path("gml", None))
    }

    fn script_cache(&self) -> Result<&ScriptCache> {
        self.expect_kind(ResourceKind::Script)?;
        match &self.payload {
            Payload::Script(cache) => Ok(cache),
            _ => Err(anyhow!("Script {} has no code cache", self.name())),
        }
    }

    /// Script source, read once and cached.
    pub fn code(&self) -> Result<&str> {
        let path = self.code_file_path()?;
        let cache = self.script_cache()?;
        if let Some(code) = cache.code.get() {
            return Ok(code);
        }
        let code = self.storage().read_text(&path)?;
        Ok(cache.code.get_or_init(|| code))
    }

    /// Replace the script source on disk. Cached code and functions are dropped.
    pub fn set_code(&mut self, code: &str) -> Result<bool> {
        let path = self.code_file_path()?;
        let changed = self.storage().write_text(&path, code)?;
        self.invalidate_caches();
        Ok(changed)
    }

    /// Functions declared in the outermost scope of this script.
    pub fn global_functions(&self) -> Result<&[GmlToken]> {
        let code = self.code()?;
        let cache = self.script_cache()?;
        Ok(cache.functions.get_or_init(|| find_outer_functions(code)))
    }
}
