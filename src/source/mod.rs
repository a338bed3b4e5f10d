//! Locating source projects.
//!
//! Commands that read from another project (`merge`, `import-modules`) take
//! a source coordinate. A [`SourceResolver`] turns that coordinate into a
//! local path holding a project: either its directory or its `.yyp`.
//!
//! [`LocalSource`] resolves coordinates in this order:
//!
//! 1. an alias from the `[sources]` table of the global configuration;
//! 2. a path, after `~` and `$VAR` expansion.
//!
//! Anything else is a [`StitchError::SourceNotFound`].

use crate::config::GlobalConfig;
use crate::core::StitchError;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;

/// Turns a source coordinate into a local project path.
pub trait SourceResolver {
    /// Resolve `coordinate` to an existing local path.
    fn resolve(&self, coordinate: &str) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Resolves aliases and local paths.
#[derive(Debug, Clone, Default)]
pub struct LocalSource {
    aliases: BTreeMap<String, String>,
}

impl LocalSource {
    /// A resolver that only knows plain paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver using the `[sources]` aliases of `config`.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            aliases: config.sources.clone(),
        }
    }

    /// Add or replace an alias.
    #[must_use]
    pub fn with_alias(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), path.into());
        self
    }
}

fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand environment variables in path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

impl SourceResolver for LocalSource {
    async fn resolve(&self, coordinate: &str) -> Result<PathBuf> {
        let (path, via_alias) = match self.aliases.get(coordinate) {
            Some(aliased) => (expand(aliased)?, true),
            None => (expand(coordinate)?, false),
        };
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(
                "Resolved source {} to {}{}",
                coordinate,
                path.display(),
                if via_alias { " (alias)" } else { "" }
            );
            return Ok(path);
        }
        let name = if via_alias {
            format!("{coordinate} ({})", path.display())
        } else {
            coordinate.to_string()
        };
        Err(StitchError::SourceNotFound { name }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::find_stitch_error;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_resolves_paths_and_aliases() -> Result<()> {
        let temp = TempDir::new()?;
        let lib = temp.path().join("SharedLib");
        std::fs::create_dir_all(&lib)?;
        let lib_str = lib.to_string_lossy().into_owned();

        let resolver = LocalSource::new().with_alias("shared", lib_str.clone());
        assert_eq!(resolver.resolve("shared").await?, lib);
        assert_eq!(resolver.resolve(&lib_str).await?, lib);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_source() -> Result<()> {
        let temp = TempDir::new()?;
        let missing = temp.path().join("missing").to_string_lossy().into_owned();
        let resolver = LocalSource::new().with_alias("gone", missing.clone());

        for coordinate in ["gone", missing.as_str(), "not-an-alias"] {
            let err = resolver.resolve(coordinate).await.unwrap_err();
            assert!(matches!(find_stitch_error(&err), Some(StitchError::SourceNotFound { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_from_config() -> Result<()> {
        let temp = TempDir::new()?;
        let mut config = GlobalConfig::default();
        config.add_source("lib".to_string(), temp.path().to_string_lossy().into_owned());
        let resolver = LocalSource::from_config(&config);
        assert_eq!(resolver.resolve("lib").await?, temp.path());
        Ok(())
    }
}
