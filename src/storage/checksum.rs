//! SHA-256 checksums used to skip no-op writes and copies.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Checksum of an in-memory buffer, formatted as `sha256:<hex>`.
#[must_use]
pub fn checksum_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Checksum of a file on disk, formatted as `sha256:<hex>`.
///
/// # Errors
///
/// Fails if the file cannot be read.
pub fn compute_checksum(path: &Path) -> Result<String> {
    let content = fs::read(path).with_context(|| {
        format!(
            "Cannot read file for checksum calculation: {}\n\n\
                Check that the file exists and is readable.",
            path.display()
        )
    })?;
    Ok(checksum_bytes(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checksum_of_empty_buffer() {
        assert_eq!(
            checksum_bytes(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_file_checksum_matches_buffer() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("a.txt");
        fs::write(&path, "hello")?;
        assert_eq!(compute_checksum(&path)?, checksum_bytes(b"hello"));
        Ok(())
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(compute_checksum(Path::new("/definitely/not/here")).is_err());
    }
}
