//! Blank out comments and string literals while keeping byte offsets.

use serde::Serialize;

/// What kind of lexical noise was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovedKind {
    /// `// ...` to end of line
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `"..."` or `'...'` with backslash escapes
    String,
    /// `@"..."` or `@'...'` without escapes
    VerbatimString,
}

/// A comment or string that was blanked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removed {
    /// Kind of construct
    pub kind: RemovedKind,
    /// Original text, delimiters included
    pub code: String,
    /// Byte offset of the construct in the input
    pub position: usize,
    /// Zero-based line of the construct
    pub line: usize,
}

/// Result of [`strip_comments_and_strings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    /// Input with every removed byte replaced by a space
    pub stripped: String,
    /// Everything that was removed, in source order
    pub removed: Vec<Removed>,
}

/// Replace the content of comments and strings with spaces.
///
/// Comments are blanked entirely, strings keep their delimiters. Line
/// breaks are never touched, so offsets, line and column numbers computed
/// on the output are valid for the input. Unterminated constructs extend
/// to the end of input.
#[must_use]
pub fn strip_comments_and_strings(text: &str) -> Stripped {
    let src = text.as_bytes();
    let len = src.len();
    let mut out = src.to_vec();
    let mut removed = Vec::new();
    let mut i = 0;

    while i < len {
        let next = src.get(i + 1).copied();
        let (kind, end, blank_from, blank_to) = match (src[i], next) {
            (b'/', Some(b'/')) => {
                let end = find_byte(src, i + 2, b'\n').unwrap_or(len);
                (RemovedKind::LineComment, end, i, end)
            }
            (b'/', Some(b'*')) => {
                let end = find_seq(src, i + 2, b"*/").map_or(len, |p| p + 2);
                (RemovedKind::BlockComment, end, i, end)
            }
            (b'@', Some(quote @ (b'"' | b'\''))) => {
                let close = find_byte(src, i + 2, quote).unwrap_or(len);
                let end = (close + 1).min(len);
                (RemovedKind::VerbatimString, end, i + 2, close)
            }
            (quote @ (b'"' | b'\''), _) => {
                let close = find_string_end(src, i + 1, quote);
                let end = (close + 1).min(len);
                (RemovedKind::String, end, i + 1, close)
            }
            _ => {
                i += 1;
                continue;
            }
        };

        blank(&mut out[blank_from..blank_to.min(len)]);
        removed.push(Removed {
            kind,
            code: String::from_utf8_lossy(&src[i..end]).into_owned(),
            position: i,
            line: count_newlines(&src[..i]),
        });
        i = end;
    }

    Stripped {
        stripped: String::from_utf8_lossy(&out).into_owned(),
        removed,
    }
}

fn blank(bytes: &mut [u8]) {
    for b in bytes.iter_mut().filter(|b| !matches!(**b, b'\n' | b'\r')) {
        *b = b' ';
    }
}

fn find_byte(src: &[u8], from: usize, needle: u8) -> Option<usize> {
    src.get(from..)?.iter().position(|&b| b == needle).map(|p| p + from)
}

fn find_seq(src: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    src.get(from..)?.windows(needle.len()).position(|w| w == needle).map(|p| p + from)
}

/// Index of the closing quote, honoring backslash escapes.
fn find_string_end(src: &[u8], from: usize, quote: u8) -> usize {
    let mut j = from;
    while j < src.len() {
        match src[j] {
            b'\\' => j += 2,
            b if b == quote => return j,
            _ => j += 1,
        }
    }
    src.len()
}

pub(crate) fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_preserved() {
        let text = "a = \"x;y\"; // note\r\nb = 1; /* multi\nline */ c();";
        let result = strip_comments_and_strings(text);
        assert_eq!(result.stripped.len(), text.len());
        assert_eq!(result.stripped, "a = \"   \";        \r\nb = 1;         \n        c();");
        assert_eq!(result.removed.len(), 3);
        assert_eq!(result.removed[1].kind, RemovedKind::LineComment);
        assert_eq!(result.removed[2].line, 1);
        assert_eq!(result.removed[2].code, "/* multi\nline */");
    }

    #[test]
    fn test_escaped_quotes_stay_inside_string() {
        let result = strip_comments_and_strings(r#"s = "say \"hi\" // not a comment"; t();"#);
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].kind, RemovedKind::String);
        assert!(result.stripped.ends_with("\"; t();"));
    }

    #[test]
    fn test_verbatim_strings() {
        let result = strip_comments_and_strings("p = @\"C:\\path\\\"; q = @'it';");
        assert_eq!(result.stripped, "p = @\"        \"; q = @'  ';");
        assert!(result.removed.iter().all(|r| r.kind == RemovedKind::VerbatimString));
    }

    #[test]
    fn test_single_quoted_strings() {
        let result = strip_comments_and_strings("x = 'a{b}';");
        assert_eq!(result.stripped, "x = '    ';");
    }

    #[test]
    fn test_unterminated_constructs_run_to_end() {
        let result = strip_comments_and_strings("f(); /* open\nforever");
        assert_eq!(result.stripped, "f();        \n       ");

        let result = strip_comments_and_strings("s = \"open");
        assert_eq!(result.stripped, "s = \"    ");
        assert_eq!(result.removed[0].code, "\"open");
    }

    #[test]
    fn test_multibyte_content_is_blanked() {
        let text = "s = \"héllo ✓\"; f();";
        let result = strip_comments_and_strings(text);
        assert_eq!(result.stripped.len(), text.len());
        assert!(result.stripped.ends_with("\"; f();"));
        assert!(result.stripped.is_ascii());
    }

    #[test]
    fn test_comment_markers_inside_strings_are_ignored() {
        let result = strip_comments_and_strings("url = \"http://x\"; y();");
        assert_eq!(result.removed.len(), 1);
        assert!(result.stripped.ends_with("y();"));
    }
}
