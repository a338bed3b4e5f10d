use super::strip::strip_comments_and_strings;
use super::token::{GmlToken, VersionedReference};
use crate::core::StitchError;
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

static FUNCTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\s*(?P<name>[A-Za-z_][A-Za-z0-9_]+)").expect("function regex is valid")
});

/// Find functions declared in the outermost scope of `text`.
///
/// Comments and strings are ignored, as is anything nested inside braces,
/// so local functions and methods are skipped. Each token points at the
/// function name.
///
/// # Examples
///
/// ```rust
/// use stitch_cli::parser::find_outer_functions;
///
/// let found = find_outer_functions("function outer(){ function inner(){} }");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].name, "outer");
/// assert_eq!(found[0].location.column, 9);
/// ```
#[must_use]
pub fn find_outer_functions(text: &str) -> Vec<GmlToken> {
    let stripped = strip_comments_and_strings(text).stripped;
    let outer = blank_nested_scopes(&stripped);
    FUNCTION_NAME
        .captures_iter(&outer)
        .filter_map(|caps| caps.name("name"))
        .map(|name| GmlToken::at(name.as_str(), text, name.start()))
        .collect()
}

/// Blank the interior of every top-level `{...}` block, keeping newlines.
///
/// Unclosed blocks run to the end of input. A `}` with no matching `{` is
/// left alone.
fn blank_nested_scopes(text: &str) -> String {
    let mut out = text.as_bytes().to_vec();
    let mut depth = 0usize;
    for b in &mut out {
        match *b {
            b'{' => {
                if depth > 0 {
                    *b = b' ';
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    *b = b' ';
                }
            }
            b'\n' | b'\r' => {}
            _ if depth > 0 => *b = b' ',
            _ => {}
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Precompiled search for references to one function name.
///
/// With a suffix pattern such as `(_v\d+)?`, both `foo` and `foo_v2` are
/// found when searching for either name. Each reference reports whether it
/// names exactly the searched version.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    name: String,
    regex: Regex,
}

impl ReferenceMatcher {
    /// Build a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidPattern`] when the suffix pattern is not
    /// a valid regex.
    pub fn new(name: &str, suffix_pattern: Option<&str>) -> Result<Self> {
        let suffix = suffix_pattern.unwrap_or("");
        let invalid = |e: regex::Error| StitchError::InvalidPattern {
            pattern: suffix.to_string(),
            reason: e.to_string(),
        };

        let mut basename = name.to_string();
        if !suffix.is_empty() {
            let splitter = Regex::new(&format!("^(.*?)(?:{suffix})$")).map_err(invalid)?;
            if let Some(base) = splitter.captures(name).and_then(|c| c.get(1)) {
                basename = base.as_str().to_string();
            }
        }

        let regex = Regex::new(&format!(
            r"\b(?P<token>{}(?P<suffix>{suffix}))\b",
            regex::escape(&basename)
        ))
        .map_err(invalid)?;

        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }

    /// The name being searched for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find every reference in `text`, ignoring comments and strings.
    #[must_use]
    pub fn find(&self, text: &str) -> Vec<VersionedReference> {
        self.find_stripped(text, &strip_comments_and_strings(text).stripped)
    }

    /// Find every reference in text already passed through
    /// [`strip_comments_and_strings`]. Locations are taken from `text`.
    #[must_use]
    pub fn find_stripped(&self, text: &str, stripped: &str) -> Vec<VersionedReference> {
        self.regex
            .captures_iter(stripped)
            .filter_map(|caps| {
                let token = caps.name("token")?;
                Some(VersionedReference {
                    token: GmlToken::at(token.as_str(), text, token.start()),
                    expected: self.name.clone(),
                    suffix: caps.name("suffix").map(|s| s.as_str().to_string()).unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Find references to `name` in `text`.
///
/// One-shot form of [`ReferenceMatcher`].
///
/// # Errors
///
/// Fails only when `suffix_pattern` is not a valid regex.
pub fn find_references(
    text: &str,
    name: &str,
    suffix_pattern: Option<&str>,
) -> Result<Vec<VersionedReference>> {
    Ok(ReferenceMatcher::new(name, suffix_pattern)?.find(text))
}
