//! Core types shared by every Stitch module.
//!
//! - [`StitchError`], [`ErrorCategory`] and [`ErrorContext`] for error handling
//! - [`ResourceKind`], the closed set of GameMaker resource kinds

pub mod error;
mod resource;

pub use error::{ErrorCategory, ErrorContext, StitchError, find_stitch_error, user_friendly_error};
pub use resource::ResourceKind;
