//! Atomic file writes using a write-then-rename strategy.
//!
//! Readers (including GameMaker itself, if the project is open) never
//! observe a half-written descriptor.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to `path`, creating parent directories as needed.
///
/// Content is written to a sibling temp file, synced, and renamed over the
/// target.
///
/// # Examples
///
/// ```rust,no_run
/// use stitch_cli::storage::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("scripts/scr_a/scr_a.gml"), b"function scr_a() {}")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = temp_path_for(path);
    {
        let mut file = fs::File::create(&temp_path).with_context(|| {
            format!(
                "Failed to create temp file: {}\n\nCheck file permissions and that the directory exists",
                temp_path.display()
            )
        })?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed to rename temp file to: {}", path.display()));
    }
    Ok(())
}

/// `dir/.name.ext.stitch-tmp`, so that `a.yy` and `a.gml` never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{file_name}.stitch-tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("nested/dir/file.yy");
        atomic_write(&path, b"{}")?;
        assert_eq!(fs::read_to_string(&path)?, "{}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_and_cleans_up() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("file.gml");
        atomic_write(&path, b"old")?;
        atomic_write(&path, b"new")?;
        assert_eq!(fs::read_to_string(&path)?, "new");

        let leftovers: Vec<_> = fs::read_dir(temp.path())?
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".stitch-tmp"))
            .collect();
        assert!(leftovers.is_empty());
        Ok(())
    }

    #[test]
    fn test_temp_path_keeps_extension_distinct() {
        let a = temp_path_for(Path::new("dir/a.yy"));
        let b = temp_path_for(Path::new("dir/a.gml"));
        assert_ne!(a, b);
    }
}
