use super::infra_error_output;
use crate::error::CliError;
use crate::format::OutputMode;
use crate::{CliOutput, to_json_output};
use profile_store_infra::{load_effective_config_json, save_request_schema_json};
use std::collections::BTreeMap;
use std::path::Path;

const ENV_PREFIX: &str = "PSTORE_";

fn collect_store_env() -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

pub fn run_config_show(
    mode: OutputMode,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let env = collect_store_env();
    let json = match load_effective_config_json(&env, config_path, overrides_json) {
        Ok(json) => json,
        Err(error) => return Ok(infra_error_output(mode, &error)),
    };

    if mode.is_json() {
        let config: serde_json::Value = serde_json::from_str(&json)?;
        let payload = serde_json::json!({
            "status": "ok",
            "config": config,
        });
        return Ok(CliOutput::ok(to_json_output(&payload)?));
    }
    Ok(CliOutput::ok(json))
}

pub fn run_schema(mode: OutputMode) -> CliOutput {
    match save_request_schema_json() {
        Ok(schema) => CliOutput::ok(schema),
        Err(error) => infra_error_output(mode, &error),
    }
}
