//! Integration test suite for Stitch
//!
//! End-to-end tests against real on-disk projects, through the library API
//! and through the `stitch` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **merge**: pattern merges, clobber policies, orphan relocation, idempotence
//! - **modules**: strict module imports
//! - **lint**: lint over real projects
//! - **cli**: the binary's commands, flags, config and exit codes

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod lint;
mod merge;
mod modules;
