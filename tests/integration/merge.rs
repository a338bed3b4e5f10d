use anyhow::Result;
use stitch_cli::constants::MERGE_CONFLICTS_FOLDER;
use stitch_cli::core::{ErrorCategory, ResourceKind, StitchError, find_stitch_error};
use stitch_cli::merge::{ClobberPolicy, MergeOptions};

use crate::common::{TestWorkspace, read_bytes, snapshot};

/// A source with a self-contained Pack module: a script, a sprite and an
/// object that uses the sprite.
fn pack_source(ws: &TestWorkspace) -> Result<()> {
    ws.source.add_script("scr_pack", "Libraries/Pack", "function pack_init(){}")?;
    ws.source.add_sprite("spr_pack", "Libraries/Pack/Sprites")?;
    ws.source.add_object_with("obj_pack", "Libraries/Pack", None, Some("spr_pack"))?;
    ws.source.add_object_event("obj_pack", "Create_0", "pack_init();")?;
    Ok(())
}

fn pack_options(move_conflicting: bool) -> Result<MergeOptions> {
    Ok(MergeOptions::builder()
        .if_folder_matches("Pack")
        .move_conflicting(move_conflicting)
        .build()?)
}

#[test]
fn test_pack_merge_then_orphan_relocation() -> Result<()> {
    let ws = TestWorkspace::new()?;
    pack_source(&ws)?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let report = target.merge_from(&source, &pack_options(true)?)?;
    assert_eq!(report.added.len(), 3);
    assert!(report.writes > 0);

    let target = ws.load_target()?;
    let script = target.resource("scr_pack")?.expect("script merged");
    assert_eq!(script.folder(), "Libraries/Pack");
    assert_eq!(script.code()?, "function pack_init(){}");
    let object = target.resource("obj_pack")?.expect("object merged");
    assert_eq!(object.sprite_name()?.as_deref(), Some("spr_pack"));
    assert_eq!(object.event_code("Create_0")?, Some("pack_init();"));
    assert!(target.folder_exists("Libraries/Pack/Sprites"));

    // Remove the script from the source and merge again
    let mut source = ws.source.load()?;
    assert!(source.delete_resource("scr_pack")?);
    source.save()?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let report = target.merge_from(&source, &pack_options(true)?)?;
    assert_eq!(report.relocated, vec!["scr_pack".to_string()]);

    let target = ws.load_target()?;
    let script = target.resource("scr_pack")?.expect("orphan kept");
    assert_eq!(script.folder(), MERGE_CONFLICTS_FOLDER);
    assert!(target.folder_exists(MERGE_CONFLICTS_FOLDER));
    Ok(())
}

#[test]
fn test_merge_is_idempotent() -> Result<()> {
    let ws = TestWorkspace::new()?;
    pack_source(&ws)?;
    ws.source.add_sound("snd_pack", "Libraries/Pack", "audiogroup_pack")?;
    ws.source.add_included_file("pack.json", "Pack", b"{\"level\":1}")?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    target.merge_from(&source, &pack_options(false)?)?;
    let after_first = snapshot(ws.target.path())?;

    let mut target = ws.load_target()?;
    let report = target.merge_from(&source, &pack_options(false)?)?;
    assert_eq!(report.writes, 0);
    assert!(report.is_unchanged());
    assert_eq!(report.replaced.len(), 4);
    assert_eq!(report.files_replaced, vec!["pack.json".to_string()]);
    assert_eq!(snapshot(ws.target.path())?, after_first);
    Ok(())
}

#[test]
fn test_merge_creates_missing_groups() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_sound("snd_theme", "Audio/Music", "audiogroup_music")?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let report = target.merge_from(&source, &MergeOptions::default())?;
    assert_eq!(report.groups_created, vec!["audiogroup_music".to_string()]);

    let target = ws.load_target()?;
    assert!(target.audio_groups().iter().any(|g| g.name() == "audiogroup_music"));
    assert_eq!(target.resource("snd_theme")?.expect("sound merged").audio_group()?, "audiogroup_music");
    Ok(())
}

#[test]
fn test_missing_dependency_leaves_target_untouched() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_object("obj_base", "Objects/Base")?;
    ws.source.add_object_with("obj_enemy", "Objects/Enemies", Some("obj_base"), None)?;
    ws.target.add_script("scr_existing", "Scripts", "function existing(){}")?;
    let before = snapshot(ws.target.path())?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let options = MergeOptions::builder().if_folder_matches("^Objects/Enemies").build()?;
    let err = target.merge_from(&source, &options).unwrap_err();

    let stitch_error = find_stitch_error(&err).expect("typed error");
    assert!(matches!(stitch_error, StitchError::MissingDependency { .. }));
    assert_eq!(stitch_error.category(), ErrorCategory::Consistency);
    assert_eq!(target.storage().writes(), 0);
    assert_eq!(snapshot(ws.target.path())?, before);

    // Without the check the merge goes through
    let options = MergeOptions::builder()
        .if_folder_matches("^Objects/Enemies")
        .check_dependencies(false)
        .build()?;
    let report = ws.load_target()?.merge_from(&source, &options)?;
    assert_eq!(report.added, vec!["obj_enemy".to_string()]);
    Ok(())
}

/// Source `scr_shared` is in scope by name, the target copy lives elsewhere.
fn clobber_workspace() -> Result<TestWorkspace> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_shared", "Incoming", "// source version")?;
    ws.source.add_script("scr_new", "Incoming", "// brand new")?;
    ws.target.add_script("scr_shared", "Local", "// target version")?;
    Ok(ws)
}

fn clobber_options(policy: ClobberPolicy) -> Result<MergeOptions> {
    Ok(MergeOptions::builder()
        .if_folder_matches("^Incoming$")
        .on_clobber(policy)
        .build()?)
}

#[test]
fn test_clobber_overwrite_replaces_and_warns() -> Result<()> {
    let ws = clobber_workspace()?;
    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let report = target.merge_from(&source, &clobber_options(ClobberPolicy::Overwrite)?)?;

    assert!(report.replaced.contains(&"scr_shared".to_string()));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("scr_shared"));
    assert_eq!(
        read_bytes(ws.target.path(), "scripts/scr_shared/scr_shared.gml"),
        b"// source version"
    );
    Ok(())
}

#[test]
fn test_clobber_skip_keeps_target_bytes() -> Result<()> {
    let ws = clobber_workspace()?;
    let yy_before = read_bytes(ws.target.path(), "scripts/scr_shared/scr_shared.yy");

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let report = target.merge_from(&source, &clobber_options(ClobberPolicy::Skip)?)?;

    assert_eq!(report.skipped, vec!["scr_shared".to_string()]);
    assert_eq!(report.added, vec!["scr_new".to_string()]);
    assert_eq!(
        read_bytes(ws.target.path(), "scripts/scr_shared/scr_shared.gml"),
        b"// target version"
    );
    assert_eq!(read_bytes(ws.target.path(), "scripts/scr_shared/scr_shared.yy"), yy_before);
    Ok(())
}

#[test]
fn test_clobber_error_aborts_before_any_write() -> Result<()> {
    let ws = clobber_workspace()?;
    let before = snapshot(ws.target.path())?;

    let source = ws.source.load()?;
    let mut target = ws.load_target()?;
    let err = target
        .merge_from(&source, &clobber_options(ClobberPolicy::Error)?)
        .unwrap_err();

    assert!(matches!(
        find_stitch_error(&err),
        Some(StitchError::ClobberConflict { .. })
    ));
    assert_eq!(target.storage().writes(), 0);
    assert_eq!(snapshot(ws.target.path())?, before);
    assert!(target.resource("scr_new")?.is_none());
    Ok(())
}

#[test]
fn test_kind_whitelist_and_name_patterns() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_ui_button", "UI", "function ui_button(){}")?;
    ws.source.add_sprite("spr_ui_button", "UI")?;
    ws.source.add_object("obj_player", "Gameplay")?;

    let source = ws.source.load()?;
    let options = MergeOptions::builder()
        .if_name_matches("_UI_")
        .kinds([ResourceKind::Sprite])
        .build()?;
    let report = ws.load_target()?.merge_from(&source, &options)?;
    assert_eq!(report.added, vec!["spr_ui_button".to_string()]);

    let target = ws.load_target()?;
    assert_eq!(target.resources().len(), 1);
    assert!(target.resource("obj_player")?.is_none());
    Ok(())
}

#[test]
fn test_included_files_follow_options() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_included_file("levels.json", "Pack", b"[1,2,3]")?;
    ws.target.add_included_file("levels.json", "Pack", b"[]")?;
    let source = ws.source.load()?;

    let skip_files = MergeOptions::builder()
        .if_folder_matches("Pack")
        .include_included_files(false)
        .build()?;
    let report = ws.load_target()?.merge_from(&source, &skip_files)?;
    assert!(report.files_replaced.is_empty());
    assert_eq!(read_bytes(ws.target.path(), "datafiles/Pack/levels.json"), b"[]");

    let report = ws.load_target()?.merge_from(&source, &pack_options(false)?)?;
    assert_eq!(report.files_replaced, vec!["levels.json".to_string()]);
    assert_eq!(read_bytes(ws.target.path(), "datafiles/Pack/levels.json"), b"[1,2,3]");
    Ok(())
}

#[test]
fn test_read_only_target_is_refused() -> Result<()> {
    let ws = TestWorkspace::new()?;
    pack_source(&ws)?;
    let source = ws.source.load()?;
    let mut target = stitch_cli::project::Project::load(
        ws.target.path(),
        stitch_cli::project::ProjectOptions {
            read_only: true,
            allow_dirty: true,
        },
    )?;

    let err = target.merge_from(&source, &pack_options(false)?).unwrap_err();
    assert!(matches!(find_stitch_error(&err), Some(StitchError::ReadOnly { .. })));
    Ok(())
}
