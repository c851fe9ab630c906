//! CLI config and request validation E2E tests.

#![allow(missing_docs)]

use profile_store_testkit::fixture_root;
use serde_json::Value;
use std::io;
use std::process::{Command, Output};

fn run_cli_with_env(env: &[(&str, &str)], args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pstore"));
    for (key, _) in std::env::vars() {
        if key.starts_with("PSTORE_") {
            command.env_remove(key);
        }
    }
    command.envs(env.iter().copied()).args(args).output()
}

fn run_cli(args: &[&str]) -> io::Result<Output> {
    run_cli_with_env(&[("PSTORE_LOCAL_PROVIDER", "memory")], args)
}

fn fixture(relative: &str) -> String {
    fixture_root().join(relative).display().to_string()
}

fn stdout_json(output: &Output) -> io::Result<Value> {
    serde_json::from_slice(&output.stdout).map_err(io::Error::other)
}

#[test]
fn config_show_prints_effective_config() -> io::Result<()> {
    let config = fixture("config/store-config.valid.json");
    let output = run_cli_with_env(
        &[("PSTORE_REMOTE_API_TOKEN", "tok-secret")],
        &["--config", &config, "config", "show"],
    )?;
    assert!(output.status.success());

    let effective = stdout_json(&output)?;
    assert_eq!(effective["local"]["provider"], "sqlite");
    assert_eq!(effective["local"]["sizeCeilingBytes"], 1_048_576);
    assert_eq!(effective["remote"]["timeoutMs"], 2500);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("tok-secret"));
    Ok(())
}

#[test]
fn config_show_json_wraps_the_config() -> io::Result<()> {
    let output = run_cli(&[
        "--json",
        "--overrides-json",
        r#"{"notifications":{"errorDurationMs":9000}}"#,
        "config",
        "show",
    ])?;
    assert!(output.status.success());

    let payload = stdout_json(&output)?;
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["config"]["local"]["provider"], "memory");
    assert_eq!(payload["config"]["notifications"]["errorDurationMs"], 9000);
    Ok(())
}

#[test]
fn out_of_range_config_exits_with_invalid_input() -> io::Result<()> {
    let config = fixture("config/store-config.invalid-limit.json");
    let output = run_cli(&["--json", "--config", &config, "config", "show"])?;
    assert_eq!(output.status.code(), Some(2));

    let payload = stdout_json(&output)?;
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error"]["kind"], "expected");
    Ok(())
}

#[test]
fn schema_describes_the_save_request() -> io::Result<()> {
    let output = run_cli(&["schema"])?;
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("knowledgeFiles"));
    assert!(text.contains("capabilities"));
    Ok(())
}

#[test]
fn save_without_a_name_is_rejected() -> io::Result<()> {
    let request = fixture("requests/save-config.missing-name.json");
    let output = run_cli(&["save", "--file", &request, "--json"])?;
    assert_eq!(output.status.code(), Some(2));

    let payload = stdout_json(&output)?;
    assert_eq!(payload["status"], "error");
    Ok(())
}

#[test]
fn save_requires_an_input_source() -> io::Result<()> {
    let output = run_cli(&["save"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing --file or --stdin"));
    Ok(())
}
