//! Path helpers shared by storage and the project model.
//!
//! GameMaker always stores paths with forward slashes, regardless of platform.

use std::path::Path;

/// Convert a path to the forward-slash form stored in descriptor files.
///
/// Windows extended-length prefixes (`\\?\`) are dropped.
///
/// # Examples
///
/// ```rust
/// use stitch_cli::utils::normalize_path_for_storage;
///
/// assert_eq!(normalize_path_for_storage(r"sprites\spr_a\spr_a.yy"), "sprites/spr_a/spr_a.yy");
/// ```
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let path_str = path.as_ref().to_string_lossy();

    let cleaned = if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
        format!("//{stripped}")
    } else if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        path_str.to_string()
    };

    cleaned.replace('\\', "/")
}

/// Normalize a logical folder path: forward slashes, no empty segments,
/// no leading or trailing separator.
///
/// # Examples
///
/// ```rust
/// use stitch_cli::utils::normalize_folder;
///
/// assert_eq!(normalize_folder("/Sprites\\UI//Buttons/"), "Sprites/UI/Buttons");
/// ```
#[must_use]
pub fn normalize_folder(folder: &str) -> String {
    folder
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every ancestor of a folder path including itself, shortest first.
///
/// `"A/B/C"` yields `["A", "A/B", "A/B/C"]`.
#[must_use]
pub fn folder_hierarchy(folder: &str) -> Vec<String> {
    let normalized = normalize_folder(folder);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    (1..=segments.len()).map(|n| segments[..n].join("/")).collect()
}
