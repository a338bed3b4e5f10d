//! Configuration management for Stitch.
//!
//! Stitch has two configuration layers:
//!
//! 1. **Global configuration** (`~/.stitch/config.toml`): source aliases and
//!    defaults for `merge` and `lint`. See [`GlobalConfig`].
//! 2. **Project settings** (`stitch.config.json` next to the `.yyp`): group
//!    assignments that travel with the project. See
//!    [`ProjectSettings`](crate::project::ProjectSettings).
//!
//! Library entry points never read configuration on their own. Callers build
//! explicit option structs ([`MergeOptions`](crate::merge::MergeOptions),
//! [`ProjectOptions`](crate::project::ProjectOptions),
//! [`LintOptions`](crate::lint::LintOptions)), and the CLI fills them from
//! flags first and configuration second.

mod global;

pub use global::{GlobalConfig, LintDefaults, MergeDefaults};
