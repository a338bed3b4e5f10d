use anyhow::Result;
use stitch_cli::parser::{RemovedKind, find_outer_functions, find_references, strip_comments_and_strings};

const INVENTORY: &str = concat!(
    "/// Inventory helpers\n",
    "function inventory_add(item) {\n",
    "\tfunction nested_helper() {}\n",
    "\tvar msg = \"function not_real() {}\";\n",
    "}\n",
    "\n",
    "  function inventory_clear(){ }\n",
);

#[test]
fn test_outer_functions_report_name_locations() {
    let found = find_outer_functions(INVENTORY);
    let names: Vec<&str> = found.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["inventory_add", "inventory_clear"]);

    assert_eq!(found[0].location.line, 1);
    assert_eq!(found[0].location.column, 9);
    assert_eq!(found[1].location.line, 6);
    assert_eq!(found[1].location.column, 11);
    assert_eq!(&INVENTORY[found[1].location.position..][..15], "inventory_clear");
}

#[test]
fn test_malformed_source_is_best_effort() {
    // Unclosed block and string never raise
    let found = find_outer_functions("function first(){\n  var s = \"oops\nfunction second(){}");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "first");
    assert!(find_outer_functions("").is_empty());
}

#[test]
fn test_exact_and_stale_versions() -> Result<()> {
    let code = "foo();\nfoo_v2();\nfoo_v10(); food(); my_foo();";
    let refs = find_references(code, "foo_v2", Some(r"(_v\d+)?"))?;
    let found: Vec<(&str, bool)> = refs
        .iter()
        .map(|r| (r.token.name.as_str(), r.is_correct_version()))
        .collect();
    assert_eq!(found, vec![("foo", false), ("foo_v2", true), ("foo_v10", false)]);
    assert_eq!(refs[1].suffix, "_v2");
    assert_eq!(refs[1].token.location.line, 1);
    assert_eq!(refs[2].token.location.column, 0);
    Ok(())
}

#[test]
fn test_references_without_suffix_are_exact() -> Result<()> {
    let refs = find_references("foo(); foo_v2(); // foo()", "foo", None)?;
    assert_eq!(refs.len(), 1);
    assert!(refs[0].is_correct_version());
    Ok(())
}

#[test]
fn test_invalid_suffix_pattern_is_an_error() {
    assert!(find_references("foo();", "foo", Some("(_v")).is_err());
}

#[test]
fn test_stripping_keeps_offsets() {
    let text = "a = \"x\"; // note\nb = @'raw';\n/* multi\nline */ c = 1;";
    let stripped = strip_comments_and_strings(text);
    assert_eq!(stripped.stripped.len(), text.len());
    assert_eq!(stripped.stripped.matches('\n').count(), text.matches('\n').count());
    assert!(stripped.stripped.contains("c = 1;"));
    assert!(!stripped.stripped.contains("note"));
    assert!(!stripped.stripped.contains("raw"));

    let kinds: Vec<RemovedKind> = stripped.removed.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RemovedKind::String,
            RemovedKind::LineComment,
            RemovedKind::VerbatimString,
            RemovedKind::BlockComment,
        ]
    );
    assert_eq!(stripped.removed[3].line, 2);
}
