//! Global configuration for Stitch.
//!
//! The user-wide configuration file lives at `~/.stitch/config.toml`
//! (`%LOCALAPPDATA%\stitch\config.toml` on Windows). The CLI can point at
//! another file with `--config` or the `STITCH_CONFIG` environment variable.
//!
//! ```toml
//! # Aliases usable wherever a source project is expected
//! [sources]
//! shared = "~/gamedev/SharedLib"
//! ui-kit = "/work/ui-kit/UIKit.yyp"
//!
//! # Defaults for `stitch merge` when the flag is not given
//! [merge]
//! on_clobber = "skip"
//! move_conflicting = true
//!
//! [lint]
//! version_suffix = "(_v\\d+)?"
//! ```
//!
//! A missing file is not an error; every setting is optional.

use crate::merge::{ClobberPolicy, MergeOptionsBuilder};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Defaults applied to `stitch merge` for options the command line omits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_clobber: Option<ClobberPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_conflicting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_dependencies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_included_files: Option<bool>,
}

impl MergeDefaults {
    /// Seed a builder with these defaults. Later builder calls override them.
    #[must_use]
    pub fn apply_to(&self, mut builder: MergeOptionsBuilder) -> MergeOptionsBuilder {
        if let Some(policy) = self.on_clobber {
            builder = builder.on_clobber(policy);
        }
        if let Some(relocate) = self.move_conflicting {
            builder = builder.move_conflicting(relocate);
        }
        if let Some(check) = self.check_dependencies {
            builder = builder.check_dependencies(check);
        }
        if let Some(include) = self.include_included_files {
            builder = builder.include_included_files(include);
        }
        builder
    }

    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Defaults for `stitch lint`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_suffix: Option<String>,
}

impl LintDefaults {
    fn is_empty(&self) -> bool {
        self.version_suffix.is_none()
    }
}

/// Contents of the global configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Source aliases to local project paths; `~` and `$VAR` are expanded
    /// when the alias is resolved
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "MergeDefaults::is_empty")]
    pub merge: MergeDefaults,

    #[serde(default, skip_serializing_if = "LintDefaults::is_empty")]
    pub lint: LintDefaults,
}

impl GlobalConfig {
    /// Load from the default location, or defaults when there is no file.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, else from the default location.
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No global config at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML for this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Write to a specific file, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))?;
        Ok(())
    }

    /// Platform default location of the config file.
    ///
    /// # Errors
    ///
    /// Fails when the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("stitch")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".stitch")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Add or update a source alias.
    pub fn add_source(&mut self, name: String, path: String) {
        self.sources.insert(name, path);
    }

    /// The path configured for an alias.
    #[must_use]
    pub fn get_source(&self, name: &str) -> Option<&String> {
        self.sources.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeOptions;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_load_round_trip() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("nested/config.toml");

        let mut config = GlobalConfig::default();
        config.add_source("shared".to_string(), "~/SharedLib".to_string());
        config.merge.on_clobber = Some(ClobberPolicy::Skip);
        config.save_to(&path).await?;

        let loaded = GlobalConfig::load_from(&path).await?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.get_source("shared").map(String::as_str), Some("~/SharedLib"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_default() -> Result<()> {
        let temp = TempDir::new()?;
        let config = GlobalConfig::load_with_optional(Some(temp.path().join("none.toml"))).await?;
        assert_eq!(config, GlobalConfig::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_parse_sections() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[sources]\nlib = \"/tmp/lib\"\n\n[merge]\non_clobber = \"error\"\ncheck_dependencies = false\n\n[lint]\nversion_suffix = \"_v\\\\d+\"\n",
        )?;
        let config = GlobalConfig::load_from(&path).await?;
        assert_eq!(config.merge.on_clobber, Some(ClobberPolicy::Error));
        assert_eq!(config.lint.version_suffix.as_deref(), Some(r"_v\d+"));

        let options = config.merge.apply_to(MergeOptions::builder()).build()?;
        assert_eq!(options.on_clobber(), ClobberPolicy::Error);
        assert!(!options.check_dependencies());
        assert!(options.include_included_files());

        std::fs::write(&path, "[merge]\non_clobber = \"sometimes\"\n")?;
        assert!(GlobalConfig::load_from(&path).await.is_err());
        Ok(())
    }

    #[test]
    fn test_default_path_ends_with_config_toml() -> Result<()> {
        let path = GlobalConfig::default_path()?;
        assert!(path.ends_with("config.toml"));
        Ok(())
    }
}
