//! Filesystem access for a GameMaker project.
//!
//! Every read and write a [`Project`](crate::project::Project) and its
//! resources perform goes through one shared [`Storage`]. It provides:
//!
//! - **Checksum-aware writes**: a write whose content matches what is already
//!   on disk is skipped, which makes repeated merges no-ops.
//! - **Atomic writes**: content lands via temp file plus rename.
//! - **Read-only mode**: every mutating call fails with
//!   [`StitchError::ReadOnly`].
//! - **Working tree guard**: projects with uncommitted git changes are refused
//!   unless the guard is bypassed.
//! - **Write counting**: [`Storage::writes`] reports how many files were
//!   written or deleted through this storage and its clones.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stitch_cli::storage::Storage;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let storage = Storage::new(false, true);
//! let changed = storage.write_text(Path::new("scripts/scr_a/scr_a.gml"), "// hi")?;
//! assert!(changed);
//! assert!(!storage.write_text(Path::new("scripts/scr_a/scr_a.gml"), "// hi")?);
//! # Ok(())
//! # }
//! ```

mod atomic;
mod checksum;
mod git;

pub use atomic::atomic_write;
pub use checksum::{checksum_bytes, compute_checksum};
pub use git::{git_command, is_working_tree_clean};

use crate::core::StitchError;
use crate::yy;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Shared filesystem adapter with checksum-aware, atomic writes.
///
/// Clones share the same write counter.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    read_only: bool,
    allow_dirty: bool,
    writes: Arc<AtomicUsize>,
}

impl Storage {
    /// Create a storage.
    ///
    /// `allow_dirty` disables the working tree guard.
    #[must_use]
    pub fn new(read_only: bool, allow_dirty: bool) -> Self {
        Self {
            read_only,
            allow_dirty,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Whether mutating calls are refused.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of files written or deleted so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn ensure_writable(&self, path: &Path) -> Result<()> {
        if self.read_only {
            return Err(StitchError::ReadOnly {
                path: path.display().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Refuse to continue if `dir` has uncommitted git changes.
    ///
    /// Skipped for read-only storage and when dirty trees are allowed.
    pub fn ensure_clean_working_tree(&self, dir: &Path) -> Result<()> {
        if self.read_only || self.allow_dirty {
            return Ok(());
        }
        if !is_working_tree_clean(dir)? {
            return Err(StitchError::DirtyWorkingTree {
                path: dir.display().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether a file or directory exists.
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Read raw bytes.
    pub fn read_blob(&self, path: &Path) -> Result<Vec<u8>> {
        if !path.exists() {
            return Err(StitchError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Read a UTF-8 text file.
    pub fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = self.read_blob(path)?;
        String::from_utf8(bytes)
            .with_context(|| format!("File is not valid UTF-8: {}", path.display()))
    }

    /// Write bytes unless the file already holds exactly this content.
    ///
    /// Returns whether anything was written.
    pub fn write_blob(&self, path: &Path, content: &[u8]) -> Result<bool> {
        self.ensure_writable(path)?;
        if path.is_file() && compute_checksum(path)? == checksum_bytes(content) {
            trace!("Unchanged, skipping write: {}", path.display());
            return Ok(false);
        }
        atomic_write(path, content)?;
        self.record_write();
        debug!("Wrote {}", path.display());
        Ok(true)
    }

    /// Text variant of [`Storage::write_blob`].
    pub fn write_text(&self, path: &Path, content: &str) -> Result<bool> {
        self.write_blob(path, content.as_bytes())
    }

    /// Read and parse a descriptor file.
    pub fn read_yy(&self, path: &Path) -> Result<Value> {
        let text = self.read_text(path)?;
        yy::parse(&text).map_err(|e| {
            StitchError::YyParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Read a descriptor file straight into a typed value.
    pub fn read_yy_as<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let text = self.read_text(path)?;
        yy::from_str(&text).map_err(|e| {
            StitchError::YyParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Serialize in descriptor layout and write if the text changed.
    pub fn write_yy<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<bool> {
        let text = yy::to_string(value)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        self.write_text(path, &text)
    }

    /// Copy a file or sync a directory, returning how many files changed.
    ///
    /// Directories are synced non-sparsely: destination files absent from the
    /// source are removed.
    pub fn copy(&self, src: &Path, dest: &Path) -> Result<usize> {
        if src.is_dir() {
            self.copy_dir(src, dest, false)
        } else {
            Ok(usize::from(self.copy_file(src, dest)?))
        }
    }

    /// Copy one file, skipping the write when checksums already match.
    pub fn copy_file(&self, src: &Path, dest: &Path) -> Result<bool> {
        let content = self.read_blob(src)?;
        self.write_blob(dest, &content)
    }

    /// Sync the contents of `src` into `dest`.
    ///
    /// When `sparse` is false, files in `dest` that do not exist in `src` are
    /// deleted.
    pub fn copy_dir(&self, src: &Path, dest: &Path, sparse: bool) -> Result<usize> {
        if !src.is_dir() {
            return Err(StitchError::FileNotFound {
                path: src.display().to_string(),
            }
            .into());
        }
        let mut changed = 0;
        let mut expected = BTreeSet::new();
        for file in self.list_files(src, true, None)? {
            let relative = file.strip_prefix(src).with_context(|| {
                format!("{} is not inside {}", file.display(), src.display())
            })?;
            expected.insert(relative.to_path_buf());
            if self.copy_file(&file, &dest.join(relative))? {
                changed += 1;
            }
        }

        if !sparse && dest.is_dir() {
            for file in self.list_files(dest, true, None)? {
                let relative = file.strip_prefix(dest).with_context(|| {
                    format!("{} is not inside {}", file.display(), dest.display())
                })?;
                if !expected.contains(relative) {
                    self.delete_file(&file)?;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// List files in `dir`, sorted, optionally filtered by extension
    /// (case-insensitive, without the dot).
    ///
    /// A missing directory yields an empty list.
    pub fn list_files(
        &self,
        dir: &Path,
        recursive: bool,
        extensions: Option<&[&str]>,
    ) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .list_paths(dir, recursive)?
            .into_iter()
            .filter(|p| p.is_file())
            .filter(|p| match extensions {
                None => true,
                Some(exts) => p
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .is_some_and(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(&e))),
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// List files and directories under `dir`, sorted.
    pub fn list_paths(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let walker = WalkDir::new(dir).min_depth(1);
        let walker = if recursive { walker } else { walker.max_depth(1) };
        let mut paths = Vec::new();
        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to list directory: {}", dir.display()))?;
            paths.push(entry.into_path());
        }
        paths.sort();
        Ok(paths)
    }

    /// Delete a file if it exists.
    pub fn delete_file(&self, path: &Path) -> Result<bool> {
        self.ensure_writable(path)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(path)
            .with_context(|| format!("Failed to delete file: {}", path.display()))?;
        self.record_write();
        debug!("Deleted {}", path.display());
        Ok(true)
    }

    /// Delete a directory tree if it exists.
    pub fn delete_dir(&self, path: &Path) -> Result<bool> {
        self.ensure_writable(path)?;
        if !path.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to delete directory: {}", path.display()))?;
        self.record_write();
        debug!("Deleted directory {}", path.display());
        Ok(true)
    }

    /// Create a directory and its parents.
    pub fn ensure_dir(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        self.ensure_writable(path)?;
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::find_stitch_error;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_blob_skips_identical_content() -> Result<()> {
        let temp = TempDir::new()?;
        let storage = Storage::new(false, true);
        let path = temp.path().join("a/b.txt");

        assert!(storage.write_text(&path, "one")?);
        assert!(!storage.write_text(&path, "one")?);
        assert!(storage.write_text(&path, "two")?);
        assert_eq!(storage.writes(), 2);
        assert_eq!(storage.read_text(&path)?, "two");
        Ok(())
    }

    #[test]
    fn test_clones_share_write_counter() -> Result<()> {
        let temp = TempDir::new()?;
        let storage = Storage::new(false, true);
        let clone = storage.clone();
        clone.write_text(&temp.path().join("x"), "x")?;
        assert_eq!(storage.writes(), 1);
        Ok(())
    }

    #[test]
    fn test_read_only_refuses_mutation() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("file.txt");
        fs::write(&path, "keep")?;
        let storage = Storage::new(true, false);

        let err = storage.write_text(&path, "change").unwrap_err();
        assert!(matches!(find_stitch_error(&err), Some(StitchError::ReadOnly { .. })));
        assert!(storage.delete_file(&path).is_err());
        assert_eq!(fs::read_to_string(&path)?, "keep");
        // Guard is skipped for read-only access.
        storage.ensure_clean_working_tree(temp.path())?;
        Ok(())
    }

    #[test]
    fn test_yy_round_trip() -> Result<()> {
        let temp = TempDir::new()?;
        let storage = Storage::new(false, true);
        let path = temp.path().join("thing.yy");
        let value = json!({"name": "thing", "tags": [], "parent": {"name": "a", "path": "folders/a.yy"}});

        assert!(storage.write_yy(&path, &value)?);
        assert!(!storage.write_yy(&path, &value)?);
        assert_eq!(storage.read_yy(&path)?, value);
        assert!(fs::read_to_string(&path)?.contains("\r\n"));
        Ok(())
    }

    #[test]
    fn test_read_yy_reports_parse_errors() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("broken.yy");
        fs::write(&path, "{not json")?;
        let err = Storage::default().read_yy(&path).unwrap_err();
        assert!(matches!(find_stitch_error(&err), Some(StitchError::YyParseError { .. })));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let err = Storage::default().read_blob(Path::new("/no/such/file.yy")).unwrap_err();
        assert!(matches!(find_stitch_error(&err), Some(StitchError::FileNotFound { .. })));
    }

    #[test]
    fn test_copy_dir_syncs_and_prunes() -> Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(src.join("layers"))?;
        fs::create_dir_all(&dest)?;
        fs::write(src.join("a.yy"), "a")?;
        fs::write(src.join("layers/b.png"), "b")?;
        fs::write(dest.join("stale.png"), "old")?;

        let storage = Storage::new(false, true);
        assert_eq!(storage.copy(&src, &dest)?, 3);
        assert!(dest.join("layers/b.png").is_file());
        assert!(!dest.join("stale.png").exists());

        // Nothing left to do on a second pass.
        assert_eq!(storage.copy(&src, &dest)?, 0);
        Ok(())
    }

    #[test]
    fn test_sparse_copy_keeps_extra_files() -> Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&src)?;
        fs::create_dir_all(&dest)?;
        fs::write(src.join("a.txt"), "a")?;
        fs::write(dest.join("extra.txt"), "x")?;

        Storage::new(false, true).copy_dir(&src, &dest, true)?;
        assert!(dest.join("extra.txt").is_file());
        assert!(dest.join("a.txt").is_file());
        Ok(())
    }

    #[test]
    fn test_list_files_filters_extensions() -> Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("sub"))?;
        fs::write(temp.path().join("b.GML"), "")?;
        fs::write(temp.path().join("a.yy"), "")?;
        fs::write(temp.path().join("sub/c.gml"), "")?;

        let storage = Storage::default();
        let shallow = storage.list_files(temp.path(), false, Some(&["gml"]))?;
        assert_eq!(shallow, vec![temp.path().join("b.GML")]);

        let deep = storage.list_files(temp.path(), true, None)?;
        assert_eq!(deep.len(), 3);
        assert!(storage.list_files(&temp.path().join("missing"), true, None)?.is_empty());
        Ok(())
    }
}
