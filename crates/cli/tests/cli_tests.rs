// Integration tests for the one-shot `cellboard` commands.
// Run with: cargo test -p cellboard-cli --test cli_tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const BOARD: &str = r#"{
    "columns": [
        {"name": "Boiler", "cellCount": 2, "cells": [
            {"content": "Температура", "value": 72.4},
            {"content": "Pumps", "subCells": [
                {"content": "P1", "value": "4", "unit": "bar"},
                {"content": "P2", "value": "6", "unit": "bar"}
            ]}
        ]},
        {"name": "Misc", "cellCount": 3, "cells": [{"content": "Door", "value": "closed"}]}
    ]
}"#;

/// Command running in `dir`, isolated from the user's settings file.
fn cellboard(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cellboard"));
    cmd.current_dir(dir);
    cmd.env("CELLBOARD_SETTINGS", dir.join("no-settings.json"));
    cmd.env_remove("CELLBOARD_LOG");
    cmd
}

fn board_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("board.json"), BOARD).unwrap();
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    cellboard(dir).args(args).output().expect("run cellboard")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_layout() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["init"]);
    assert!(output.status.success(), "exit code was {:?}", output.status);

    let text = fs::read_to_string(dir.path().join("config.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let columns = doc["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1]["name"], "Колонка 2");
    assert_eq!(columns[1]["cellCount"], 4);
    assert_eq!(columns[2]["cells"][1]["content"], "Содержимое 2-3");
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "init"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fs::read_to_string(dir.path().join("board.json")).unwrap(), BOARD);

    let output = run(dir.path(), &["--config", "board.json", "init", "--force"]);
    assert!(output.status.success());
    assert!(fs::read_to_string(dir.path().join("board.json")).unwrap().contains("Колонка 1"));
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_prints_visible_cells() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "show"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("[0] Boiler"));
    assert!(text.contains("72°C"), "gauge label missing:\n{}", text);
    assert!(text.contains("5.00"), "aggregate missing:\n{}", text);
    assert!(text.contains("6 bar"));
    // Misc is padded to three cells on load
    assert!(text.contains("Ячейка 3"));
}

#[test]
fn show_json_is_saved_form() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "show", "--json"]);
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["columns"][0]["cells"][0]["value"], "72.40");
    assert_eq!(doc["columns"][0]["cells"][0]["display"], "gauge");
    assert_eq!(doc["columns"][1]["cells"].as_array().unwrap().len(), 3);
}

#[test]
fn show_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.json"), "{ \"columns\": [").unwrap();
    let output = run(dir.path(), &["--config", "bad.json", "show"]);
    assert_eq!(output.status.code(), Some(4));

    let output = run(dir.path(), &["--config", "absent.json", "show"]);
    assert_eq!(output.status.code(), Some(3));
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_nested_cell_json() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "inspect", "0", "1", "1", "--json"]);
    assert!(output.status.success());

    let detail: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(detail["content"], "P2");
    assert_eq!(detail["text"], "6 bar");
    assert_eq!(detail["breadcrumb"], "Column 1 > Cell 2 > Sub-cell 2");
    assert_eq!(detail["partial"], false);
    assert_eq!(detail["history"][0], "6 bar");
}

#[test]
fn inspect_partial_path_falls_back() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "inspect", "0", "1", "9"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Column 1 > Cell 2\n"));
    assert!(text.contains("requested depth 1, resolved depth 0"));
    assert!(text.contains("[1] P2: 6 bar"));
}

#[test]
fn inspect_out_of_range_is_not_found() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "inspect", "5", "0"]);
    assert_eq!(output.status.code(), Some(5));
    let output = run(dir.path(), &["--config", "board.json", "inspect", "0", "2"]);
    assert_eq!(output.status.code(), Some(5));
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

#[test]
fn set_sub_cell_and_save() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "set", "0", "1", "--sub", "0", "8"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = fs::read_to_string(dir.path().join("board.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["columns"][0]["cells"][1]["subCells"][0]["value"], "8");
}

#[test]
fn set_refuses_to_replace_unreadable_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let board = dir.path().join("board.json");
    fs::write(&board, "{ \"columns\": [").unwrap();
    let settings = dir.path().join("settings.json");
    fs::write(&settings, serde_json::json!({ "board.configPath": board }).to_string()).unwrap();

    let output = cellboard(dir.path())
        .env("CELLBOARD_SETTINGS", &settings)
        .args(["set", "0", "0", "5"])
        .output()
        .expect("run cellboard");
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(fs::read_to_string(&board).unwrap(), "{ \"columns\": [");

    // read-only commands still show the built-in layout
    let output = cellboard(dir.path())
        .env("CELLBOARD_SETTINGS", &settings)
        .arg("show")
        .output()
        .expect("run cellboard");
    assert!(output.status.success());
    assert!(stdout(&output).contains("settings, not loaded"));
}

#[test]
fn set_out_of_range_leaves_file_untouched() {
    let dir = board_dir();
    let output = run(dir.path(), &["--config", "board.json", "set", "1", "7", "1"]);
    assert_eq!(output.status.code(), Some(5));
    let output = run(dir.path(), &["--config", "board.json", "set", "0", "0", "--sub", "0", "1"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(fs::read_to_string(dir.path().join("board.json")).unwrap(), BOARD);
}
