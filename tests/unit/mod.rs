//! Unit test suite for Stitch
//!
//! Tests of self-contained public APIs that need no project on disk.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod codec;
mod parser;
