//! CLI store flow E2E tests: save, list, show, delete, repair against a
//! file-backed local store.

#![allow(missing_docs)]

use profile_store_testkit::fixture_root;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_store_dir(label: &str) -> io::Result<PathBuf> {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("pstore-e2e-{label}-{unique}"));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn run_cli(store_dir: &Path, provider: &str, args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pstore"));
    for (key, _) in std::env::vars() {
        if key.starts_with("PSTORE_") {
            command.env_remove(key);
        }
    }
    command
        .current_dir(store_dir)
        .env("PSTORE_LOCAL_PROVIDER", provider)
        .env("PSTORE_LOCAL_PATH", store_dir)
        .args(args)
        .output()
}

fn stdout_json(output: &Output) -> io::Result<Value> {
    serde_json::from_slice(&output.stdout).map_err(io::Error::other)
}

fn assert_success(output: &Output, step: &str) {
    assert!(
        output.status.success(),
        "{step} failed: stdout={} stderr={}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn valid_request_path() -> String {
    fixture_root()
        .join("requests/save-config.valid.json")
        .display()
        .to_string()
}

#[test]
fn save_list_show_delete_round_trip_on_file_store() -> io::Result<()> {
    let dir = temp_store_dir("flow")?;
    let request = valid_request_path();

    let saved = run_cli(&dir, "file", &["save", "--file", &request, "--json"])?;
    assert_success(&saved, "save");
    let saved = stdout_json(&saved)?;
    assert_eq!(saved["status"], "ok");
    assert_eq!(saved["backend"], "local");
    assert_eq!(saved["config"]["name"], "Research helper");
    let id = saved["config"]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| io::Error::other("save output missing id"))?;

    let listed = run_cli(&dir, "file", &["list", "--json"])?;
    assert_success(&listed, "list");
    let listed = stdout_json(&listed)?;
    let configs = listed["configs"]
        .as_array()
        .ok_or_else(|| io::Error::other("list output missing configs"))?;
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0]["id"], id.as_str());
    assert_eq!(configs[0]["description"], "Summarizes papers");

    let shown = run_cli(&dir, "file", &["show", &id, "--json"])?;
    assert_success(&shown, "show");
    let shown = stdout_json(&shown)?;
    assert_eq!(shown["config"]["instructions"], "Cite every claim.");
    assert_eq!(shown["config"]["capabilities"]["webSearch"], true);
    assert_eq!(shown["config"]["capabilities"]["imageGeneration"], false);
    let files = shown["config"]["knowledgeFiles"]
        .as_array()
        .ok_or_else(|| io::Error::other("show output missing knowledgeFiles"))?;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "style.md");

    let deleted = run_cli(&dir, "file", &["delete", &id])?;
    assert_success(&deleted, "delete");
    assert!(String::from_utf8_lossy(&deleted.stdout).contains("status: ok"));

    let missing = run_cli(&dir, "file", &["show", &id, "--json"])?;
    assert_eq!(missing.status.code(), Some(2));
    let missing = stdout_json(&missing)?;
    assert_eq!(missing["status"], "error");
    assert_eq!(missing["error"]["code"], "core:not_found");
    assert_eq!(missing["error"]["meta"]["configId"], id.as_str());

    let listed = run_cli(&dir, "file", &["list"])?;
    assert_success(&listed, "list after delete");
    let text = String::from_utf8_lossy(&listed.stdout);
    assert!(text.contains("backend: local"));
    assert!(text.contains("(no configurations)"));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn sqlite_store_persists_between_invocations() -> io::Result<()> {
    let dir = temp_store_dir("sqlite")?;
    let request = valid_request_path();

    let saved = run_cli(&dir, "sqlite", &["save", "--file", &request])?;
    assert_success(&saved, "save");
    let text = String::from_utf8_lossy(&saved.stdout);
    assert!(text.contains("name: Research helper"));
    assert!(dir.join("store.sqlite3").is_file());

    let listed = run_cli(&dir, "sqlite", &["list", "--json"])?;
    assert_success(&listed, "list");
    let listed = stdout_json(&listed)?;
    assert_eq!(listed["configs"].as_array().map(Vec::len), Some(1));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn repair_on_a_fresh_store_reports_no_changes() -> io::Result<()> {
    let dir = temp_store_dir("repair")?;

    let output = run_cli(&dir, "file", &["repair", "--json"])?;
    assert_success(&output, "repair");
    let report = stdout_json(&output)?;
    assert_eq!(report["status"], "ok");
    assert_eq!(report["changed"], false);
    assert_eq!(report["indexRewritten"], false);
    assert_eq!(report["adopted"].as_array().map(Vec::len), Some(0));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn blank_id_is_rejected_before_touching_the_store() -> io::Result<()> {
    let dir = temp_store_dir("blank-id")?;

    let output = run_cli(&dir, "memory", &["delete", "   "])?;
    assert_eq!(output.status.code(), Some(2));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("status: error\n"));
    assert!(text.contains("kind: expected"));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
