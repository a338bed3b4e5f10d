//! Small cross-platform helpers.
//!
//! - [`paths`] - forward-slash path normalization and folder hierarchies

pub mod paths;

pub use paths::{folder_hierarchy, normalize_folder, normalize_path_for_storage};
