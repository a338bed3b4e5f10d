//! Codec for GameMaker's descriptor dialect (`.yy` and `.yyp` files).
//!
//! The dialect is JSON with a fixed, deterministic layout:
//!
//! - two-space indentation and `\r\n` line endings
//! - arrays always place one element per line
//! - objects place one property per line only down to nesting level 2 (the root
//!   object and its direct children); deeper objects collapse to one line
//! - every element and property is followed by a trailing comma, including the last
//! - 64-bit integers are kept exactly
//!
//! Reading is tolerant of trailing commas. Writing the same value always yields
//! byte-identical text, so callers can skip rewriting unchanged files.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use stitch_cli::yy;
//!
//! let value = json!({"name": "spr_player", "tags": []});
//! let text = yy::stringify(&value);
//! assert_eq!(text, "{\r\n  \"name\": \"spr_player\",\r\n  \"tags\": [],\r\n}");
//! assert_eq!(yy::parse(&text).unwrap(), value);
//! ```

mod parse;
mod stringify;

pub use parse::{from_str, parse, strip_trailing_commas};
pub use stringify::{EOL, quote, stringify, to_string};
