use serde::Serialize;
use serde_json::Value;

/// Line ending GameMaker writes into descriptor files.
pub const EOL: &str = "\r\n";

const INDENT: &str = "  ";

/// Objects at or above this nesting level get one property per line.
const MAX_GAPPED_LEVEL: usize = 2;

/// Serialize a value in the descriptor layout.
#[must_use]
pub fn stringify(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, 0, "", &mut out);
    out
}

/// Serialize any serde value in the descriptor layout.
///
/// Non-finite floats become `null`.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(stringify(&serde_json::to_value(value)?))
}

fn write_value(value: &Value, level: usize, gap: &str, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => out.push_str(&quote(text)),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            let inner_gap = format!("{gap}{INDENT}");
            out.push('[');
            out.push_str(EOL);
            for item in items {
                out.push_str(&inner_gap);
                write_value(item, level + 1, &inner_gap, out);
                out.push(',');
                out.push_str(EOL);
            }
            out.push_str(gap);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            let level = level + 1;
            let inner_gap = format!("{gap}{INDENT}");
            if level <= MAX_GAPPED_LEVEL {
                out.push('{');
                out.push_str(EOL);
                for (key, item) in map {
                    out.push_str(&inner_gap);
                    out.push_str(&quote(key));
                    out.push_str(": ");
                    write_value(item, level, &inner_gap, out);
                    out.push(',');
                    out.push_str(EOL);
                }
                out.push_str(gap);
                out.push('}');
            } else {
                out.push('{');
                for (key, item) in map {
                    out.push_str(&quote(key));
                    out.push(':');
                    write_value(item, level, &inner_gap, out);
                    out.push(',');
                }
                out.push('}');
            }
        }
    }
}

/// Quote a string, escaping control characters and the code points
/// GameMaker's own writer escapes.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if is_escapable(c) => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const fn is_escapable(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{1f}'
            | '\u{7f}'..='\u{9f}'
            | '\u{ad}'
            | '\u{600}'..='\u{604}'
            | '\u{70f}'
            | '\u{17b4}'
            | '\u{17b5}'
            | '\u{200c}'..='\u{200f}'
            | '\u{2028}'..='\u{202f}'
            | '\u{2060}'..='\u{206f}'
            | '\u{feff}'
            | '\u{fff0}'..='\u{ffff}'
    )
}
