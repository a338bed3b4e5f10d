//! Lightweight GML scanning.
//!
//! This is not a full GML parser. It does just enough lexical work to answer
//! two questions reliably:
//!
//! - Which functions does a script declare at its outermost scope? Those are
//!   the project's global functions.
//! - Where is a given function referenced, and does each reference name the
//!   expected version when names carry version suffixes like `_v2`?
//!
//! Both operations first blank out comments and string literals with
//! [`strip_comments_and_strings`], which keeps byte offsets intact so every
//! reported location is valid in the original text. Malformed source never
//! causes an error; the scan simply does its best.
//!
//! # Examples
//!
//! ```rust
//! use stitch_cli::parser::{find_outer_functions, find_references};
//!
//! # fn main() -> anyhow::Result<()> {
//! let code = "function draw_hud(){}\ndraw_hud_v1();";
//! let functions = find_outer_functions(code);
//! assert_eq!(functions[0].name, "draw_hud");
//!
//! let refs = find_references(code, "draw_hud", Some(r"(_v\d+)?"))?;
//! assert_eq!(refs.len(), 2);
//! assert!(!refs[1].is_correct_version());
//! # Ok(())
//! # }
//! ```

mod functions;
mod strip;
mod token;

pub use functions::{ReferenceMatcher, find_outer_functions, find_references};
pub use strip::{Removed, RemovedKind, Stripped, strip_comments_and_strings};
pub use token::{GmlToken, TokenLocation, VersionedReference};
