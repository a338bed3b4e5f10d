use anyhow::Result;
use stitch_cli::constants::MODULE_CONFLICTS_FOLDER;
use stitch_cli::core::{StitchError, find_stitch_error};
use stitch_cli::merge::ModuleImporter;

use crate::common::{TestWorkspace, read_bytes, snapshot};

#[test]
fn test_import_two_modules_with_files() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_pack", "Libraries/Pack", "function pack(){}")?;
    ws.source.add_sprite("spr_hud", "UI/Hud")?;
    ws.source.add_object("obj_other", "Gameplay")?;
    ws.source.add_included_file("pack.json", "pack", b"{}")?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let report = ModuleImporter::new(&source, &mut target, ["Pack", "ui"]).run()?;

    assert_eq!(report.added, vec!["scr_pack".to_string(), "spr_hud".to_string()]);
    assert_eq!(report.files_added, vec!["pack.json".to_string()]);

    let target = ws.load_target()?;
    assert!(target.resource("obj_other")?.is_none());
    assert_eq!(target.resource("spr_hud")?.expect("sprite imported").folder(), "UI/Hud");
    assert_eq!(read_bytes(ws.target.path(), "datafiles/pack/pack.json"), b"{}");
    Ok(())
}

#[test]
fn test_module_orphans_always_move() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_pack", "Libraries/Pack", "function pack(){}")?;
    ws.target.add_script("scr_pack", "Libraries/Pack", "function pack_old(){}")?;
    ws.target.add_script("scr_pack_legacy", "Libraries/Pack", "function legacy(){}")?;

    let source = ws.source.load()?;
    let report = ws.load_target()?.import_modules(&source, &["Pack".to_string()])?;
    assert_eq!(report.replaced, vec!["scr_pack".to_string()]);
    assert_eq!(report.relocated, vec!["scr_pack_legacy".to_string()]);

    let target = ws.load_target()?;
    let legacy = target.resource("scr_pack_legacy")?.expect("orphan kept");
    assert_eq!(legacy.folder(), MODULE_CONFLICTS_FOLDER);
    assert_eq!(target.resource("scr_pack")?.expect("replaced").code()?, "function pack(){}");
    Ok(())
}

#[test]
fn test_same_name_outside_module_aborts() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_a", "Libraries/Pack", "// a")?;
    ws.source.add_script("scr_util", "Libraries/Pack", "// util")?;
    ws.target.add_script("scr_util", "Scripts", "// mine")?;
    let before = snapshot(ws.target.path())?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let err = ModuleImporter::new(&source, &mut target, ["Pack"]).run().unwrap_err();

    match find_stitch_error(&err) {
        Some(StitchError::ModuleConflict { name, module }) => {
            assert_eq!(name, "scr_util");
            assert_eq!(module, "Pack");
        }
        other => panic!("expected a module conflict, got {other:?}"),
    }
    assert_eq!(target.storage().writes(), 0);
    assert_eq!(snapshot(ws.target.path())?, before);
    Ok(())
}

#[test]
fn test_target_module_file_missing_from_source_aborts() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_included_file("a.json", "Pack", b"{}")?;
    ws.target.add_included_file("a.json", "Pack", b"{}")?;
    ws.target.add_included_file("old.json", "Pack/data", b"{}")?;

    let source = ws.source.load()?;
    let err = ws
        .load_target()?
        .import_modules(&source, &["Pack".to_string()])
        .unwrap_err();
    match find_stitch_error(&err) {
        Some(StitchError::IncludedFileConflict { names, .. }) => assert_eq!(names, &vec!["old.json".to_string()]),
        other => panic!("expected an included file conflict, got {other:?}"),
    }
    Ok(())
}
