//! Stitch - GameMaker Studio 2 project tooling
//!
//! Stitch reads and writes GameMaker Studio 2.3+ projects on disk. It can
//! copy resources and whole modules from one project into another, lint GML
//! code for unreferenced global functions and stale versioned calls, and keep
//! texture and audio group assignments in sync with the folder tree.
//!
//! # Architecture Overview
//!
//! A project is a `.yyp` file plus one descriptor (`.yy`) per resource. Stitch
//! loads both into an in-memory [`project::Project`], edits it, and saves it
//! back in GameMaker's canonical descriptor format so that diffs stay minimal:
//!
//! - [`yy`] parses and stringifies the descriptor dialect byte-exactly
//! - [`storage`] performs every filesystem access, skipping writes whose
//!   content is already on disk
//! - [`resources`] models scripts, objects, sprites, sounds, rooms and the
//!   other resource kinds behind one [`resources::Resource`] type
//! - [`project`] owns the resource registry, folders, included files,
//!   configs, groups and platform versions
//!
//! # Core Modules
//!
//! ## Project Model
//! - [`core`] - Error types and the [`core::ResourceKind`] enum
//! - [`project`] - Loading, editing and saving a project
//! - [`resources`] - Per-kind resource behavior and the resource registry
//! - [`storage`] - Checksum-aware, read-only capable file access
//! - [`yy`] - Descriptor codec
//!
//! ## Operations
//! - [`merge`] - Pattern-based merges and strict module imports
//! - [`lint`] - Global function and versioned reference checks
//! - [`parser`] - Lightweight GML scanning used by [`lint`]
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Global configuration (`~/.stitch/config.toml`)
//! - [`source`] - Resolution of source project coordinates
//! - [`constants`] - Shared folder, group and file names
//! - [`utils`] - Path normalization helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use stitch_cli::merge::MergeOptions;
//! use stitch_cli::project::{Project, ProjectOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = Project::load(
//!     "../SharedLib",
//!     ProjectOptions { read_only: true, allow_dirty: true },
//! )?;
//! let mut target = Project::load(".", ProjectOptions::default())?;
//!
//! let options = MergeOptions::builder().if_folder_matches("^Scripts/Utils").build()?;
//! let report = target.merge_from(&source, &options)?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```
#![recursion_limit = "256"]

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod lint;
pub mod merge;
pub mod parser;
pub mod project;
pub mod resources;
pub mod source;
pub mod storage;
pub mod utils;
pub mod yy;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
