use super::infra_error_output;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, to_json_output};
use profile_store_config::parse_save_config_request_json;
use profile_store_infra::{StoreCommandOptions, run_save};
use std::io::Read;
use std::path::PathBuf;

/// Where the draft JSON comes from.
#[derive(Debug, Clone)]
pub enum SaveInput {
    File(PathBuf),
    Stdin,
}

fn read_input(input: &SaveInput) -> Result<String, CliError> {
    match input {
        SaveInput::File(path) => Ok(std::fs::read_to_string(path)?),
        SaveInput::Stdin => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        },
    }
}

pub fn run_save_command(
    mode: OutputMode,
    options: &StoreCommandOptions,
    input: &SaveInput,
) -> Result<CliOutput, CliError> {
    let raw = read_input(input)?;
    let request = match parse_save_config_request_json(&raw) {
        Ok(request) => request,
        Err(error) => return Ok(format_error_output(mode, &error, ExitCode::InvalidInput)),
    };

    let outcome = match run_save(options, request) {
        Ok(outcome) => outcome,
        Err(error) => return Ok(infra_error_output(mode, &error)),
    };
    tracing::debug!(
        config_id = %outcome.metadata.id,
        backend = outcome.route.label(),
        "configuration saved"
    );

    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "backend": outcome.route.label(),
            "config": outcome.metadata,
        });
        return Ok(CliOutput::ok(to_json_output(&payload)?));
    }

    Ok(CliOutput::ok(format!(
        "status: ok\nid: {}\nname: {}\nbackend: {}\n",
        outcome.metadata.id,
        outcome.metadata.name,
        outcome.route.label()
    )))
}
