use anyhow::Result;
use stitch_cli::lint::{LintOptions, Linter};

use crate::common::TestWorkspace;

fn versioned() -> LintOptions {
    LintOptions {
        version_suffix: Some(r"(_v\d+)?".to_string()),
        ..LintOptions::default()
    }
}

#[test]
fn test_lint_across_scripts_and_events() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_script(
        "scr_inventory",
        "Scripts",
        "function inventory_add_v3(item){}\nfunction inventory_clear(){\n  function helper(){}\n}",
    )?;
    ws.target.add_script("scr_unused", "Scripts", "/* function ghost(){} */\nfunction orphan(){}")?;
    ws.target.add_object("obj_player", "Objects")?;
    ws.target.add_object_event("obj_player", "Step_0", "inventory_add_v2(\"sword\");\ninventory_clear();")?;

    let project = ws.load_target()?;
    let report = Linter::new(&project, versioned()).run()?;

    let unused: Vec<&str> = report.unreferenced_global_functions.iter().map(|f| f.token.name.as_str()).collect();
    assert_eq!(unused, vec!["orphan"]);
    assert_eq!(report.unreferenced_global_functions[0].file, "scripts/scr_unused/scr_unused.gml");
    assert_eq!(report.unreferenced_global_functions[0].token.location.line, 1);

    let outdated = &report.stale_versioned_references;
    assert_eq!(outdated.len(), 1);
    assert_eq!(outdated[0].token.name, "inventory_add_v2");
    assert_eq!(outdated[0].file, "objects/obj_player/Step_0.gml");
    assert_eq!(outdated[0].token.location.line, 0);
    assert_eq!(outdated[0].token.location.column, 0);
    Ok(())
}

#[test]
fn test_lint_without_suffix_reports_no_stale_references() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_script("scr_a", "Scripts", "function alpha(){}\nalpha();")?;
    let project = ws.load_target()?;

    let report = Linter::new(&project, LintOptions::default()).run()?;
    assert!(report.is_clean());
    assert!(report.stale_versioned_references.is_empty());

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["unreferencedGlobalFunctions"], serde_json::json!([]));
    assert_eq!(json["staleVersionedReferences"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_lint_filters_functions() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_script("scr_a", "Scripts", "function debug_draw(){}\nfunction game_start(){}")?;
    let project = ws.load_target()?;

    let only = LintOptions {
        functions: Some(vec!["game_start".to_string()]),
        ..LintOptions::default()
    };
    let report = Linter::new(&project, only).run()?;
    assert_eq!(report.unreferenced_global_functions.len(), 1);
    assert_eq!(report.unreferenced_global_functions[0].token.name, "game_start");

    let exclude = LintOptions {
        exclude_name_pattern: Some("^debug_".to_string()),
        ..LintOptions::default()
    };
    let report = Linter::new(&project, exclude).run()?;
    assert_eq!(report.unreferenced_global_functions.len(), 1);
    assert_eq!(report.unreferenced_global_functions[0].token.name, "game_start");
    Ok(())
}

#[test]
fn test_empty_project_lints_clean() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let project = ws.load_target()?;
    let report = Linter::new(&project, versioned()).run()?;
    assert!(report.is_clean());
    assert!(report.stale_versioned_references.is_empty());
    Ok(())
}
