//! Test utilities for Stitch
//!
//! This module provides helpers for writing tests against real on-disk
//! GameMaker projects:
//! - [`init_test_logging`] to see `tracing` output from a test
//! - [`ProjectFixture`] to build a minimal valid project in a temp directory
//!
//! # Example
//!
//! ```rust,no_run
//! use stitch_cli::test_utils::ProjectFixture;
//!
//! # fn example() -> anyhow::Result<()> {
//! let fixture = ProjectFixture::new()?;
//! fixture.add_script("scr_hello", "Scripts", "function hello_world(){}")?;
//! let project = fixture.load()?;
//! assert_eq!(project.resources().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::ProjectFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With no level and no `RUST_LOG`,
/// logging stays off.
///
/// ```bash
/// RUST_LOG=stitch_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
