use anyhow::Result;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;

use crate::common::{TestWorkspace, read_bytes};

#[test]
fn test_help_lists_commands() {
    let ws = TestWorkspace::new().unwrap();
    ws.stitch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("import-modules"))
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn test_merge_command_reports_and_is_idempotent() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_pack", "Libraries/Pack", "function pack(){}")?;
    ws.source.add_script("scr_other", "Scripts", "function other(){}")?;

    ws.stitch()
        .args(["merge", &ws.source_arg(), "--if-folder-matches", "pack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added (1): scr_pack"))
        .stdout(predicate::str::contains("file(s) written"));

    ws.stitch()
        .args(["merge", &ws.source_arg(), "--if-folder-matches", "pack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced (1): scr_pack"))
        .stdout(predicate::str::contains("already up to date"));

    let target = ws.load_target()?;
    assert!(target.resource("scr_other")?.is_none());
    Ok(())
}

#[test]
fn test_merge_json_output() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_sprite("spr_logo", "Sprites")?;

    let output = ws
        .stitch()
        .args(["merge", &ws.source_arg(), "--format", "json"])
        .output()?;
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["added"], serde_json::json!(["spr_logo"]));
    assert!(report["writes"].as_u64().unwrap_or_default() > 0);
    Ok(())
}

#[test]
fn test_merge_clobber_error_exits_nonzero() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_shared", "Incoming", "// source")?;
    ws.target.add_script("scr_shared", "Local", "// target")?;

    ws.stitch()
        .args(["merge", &ws.source_arg(), "--if-folder-matches", "^Incoming", "--on-clobber", "error"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scr_shared"));
    assert_eq!(read_bytes(ws.target.path(), "scripts/scr_shared/scr_shared.gml"), b"// target");
    Ok(())
}

#[test]
fn test_invalid_pattern_is_rejected() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.stitch()
        .args(["merge", &ws.source_arg(), "--if-folder-matches", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"));
    Ok(())
}

#[test]
fn test_missing_source_is_reported() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.stitch()
        .args(["merge", "no-such-alias"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-alias"));
    Ok(())
}

#[test]
fn test_source_alias_and_merge_defaults_from_config() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_shared", "Incoming", "// source")?;
    ws.target.add_script("scr_shared", "Local", "// target")?;
    ws.write_config(&format!(
        "[sources]\nshared = '{}'\n\n[merge]\non_clobber = \"skip\"\n",
        ws.source.path().display()
    ))?;

    ws.stitch()
        .args(["merge", "shared", "--if-folder-matches", "^Incoming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped (1): scr_shared"));

    // The flag wins over the config default
    ws.stitch()
        .args(["merge", "shared", "--if-folder-matches", "^Incoming", "--on-clobber", "overwrite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced (1): scr_shared"));
    Ok(())
}

#[test]
fn test_import_modules_command() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_pack", "Libraries/Pack", "function pack(){}")?;
    ws.target.add_script("scr_pack_old", "Libraries/Pack", "function old(){}")?;

    ws.stitch()
        .args(["import-modules", &ws.source_arg(), "--module", "Pack"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Relocated (1): scr_pack_old"));

    let target = ws.load_target()?;
    assert_eq!(target.resource("scr_pack_old")?.expect("kept").folder(), "MODULE_CONFLICTS");
    Ok(())
}

#[test]
fn test_lint_exit_codes() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_script("scr_a", "Scripts", "function used(){}\nused();")?;

    ws.stitch()
        .arg("lint")
        .assert()
        .success()
        .stdout(predicate::str::contains("No lint issues found"));

    ws.target.add_script("scr_b", "Scripts", "function unused_thing(){}\nused_v1();")?;
    ws.stitch()
        .args(["lint", "--suffix", r"(_v\d+)?"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Nonreferenced Functions"))
        .stdout(predicate::str::contains("scripts/scr_b/scr_b.gml:1:10 unused_thing"))
        .stdout(predicate::str::contains("Outdated Function Version References"));
    Ok(())
}

#[test]
fn test_lint_json_output() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_script("scr_a", "Scripts", "function lonely(){}")?;

    let output = ws.stitch().args(["lint", "--format", "json"]).output()?;
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["unreferencedGlobalFunctions"][0]["name"], "lonely");
    assert_eq!(report["unreferencedGlobalFunctions"][0]["file"], "scripts/scr_a/scr_a.gml");
    assert_eq!(report["staleVersionedReferences"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_lint_suffix_from_config() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_script("scr_a", "Scripts", "function draw_v2(){}\ndraw_v1();")?;
    ws.write_config("[lint]\nversion_suffix = '(_v\\d+)?'\n")?;

    ws.stitch()
        .arg("lint")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("draw_v1"));
    Ok(())
}

#[test]
fn test_jsonify_rewrites_descriptor() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let path = ws
        .target
        .write_file("notes/data.yy", b"{\"b\": [1, 2,], \"big\": 9007199254740993,}")?;

    ws.stitch()
        .args(["jsonify", "notes/data.yy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rewrote"));
    let text = fs::read_to_string(&path)?;
    assert!(text.contains("9007199254740993"));
    assert!(text.contains("\r\n"));

    ws.stitch()
        .args(["jsonify", "notes/*.yy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));
    Ok(())
}

#[test]
fn test_groups_assign_texture() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.add_sprite("spr_button", "Sprites/UI")?;
    ws.target.add_sprite("spr_tree", "Sprites/World")?;

    ws.stitch()
        .args(["groups", "assign-texture", "Sprites/UI", "tg_ui"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 resource(s) changed group"));

    let target = ws.load_target()?;
    assert_eq!(target.resource("spr_button")?.expect("sprite").texture_group()?, "tg_ui");
    assert_eq!(target.resource("spr_tree")?.expect("sprite").texture_group()?, "Default");
    assert!(target.texture_groups().iter().any(|g| g.name() == "tg_ui"));
    assert!(ws.target.path().join("stitch.config.json").exists());
    Ok(())
}

#[test]
fn test_version_set_and_show() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.target.write_file(
        "options/windows/options_windows.yy",
        b"{\"option_windows_version\": \"1.0.0.0\", \"resourceType\": \"GMWindowsOptions\",}",
    )?;

    ws.stitch()
        .args(["version", "set", "2.1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("windows"));
    ws.stitch()
        .args(["version", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("windows: 2.1.0.0"));

    ws.stitch()
        .args(["version", "set", "not-a-version"])
        .assert()
        .failure();
    Ok(())
}

#[test]
#[serial]
fn test_dirty_guard_refuses_non_repository() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.source.add_script("scr_a", "Scripts", "// a")?;

    ws.stitch_guarded()
        .args(["merge", &ws.source_arg()])
        .assert()
        .failure();
    assert!(ws.load_target()?.resource("scr_a")?.is_none());

    // The environment variable lifts the guard
    ws.stitch_guarded()
        .env("STITCH_ALLOW_DIRTY", "true")
        .args(["merge", &ws.source_arg()])
        .assert()
        .success();
    assert!(ws.load_target()?.resource("scr_a")?.is_some());
    Ok(())
}
