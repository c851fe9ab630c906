use super::infra_error_output;
use crate::error::CliError;
use crate::format::OutputMode;
use crate::{CliOutput, to_json_output};
use profile_store_infra::{StoreCommandOptions, run_list};
use std::fmt::Write as _;

pub fn run_list_command(
    mode: OutputMode,
    options: &StoreCommandOptions,
) -> Result<CliOutput, CliError> {
    let output = match run_list(options) {
        Ok(output) => output,
        Err(error) => return Ok(infra_error_output(mode, &error)),
    };

    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "backend": output.backend,
            "configs": output.entries,
        });
        return Ok(CliOutput::ok(to_json_output(&payload)?));
    }

    let mut text = format!("backend: {}\n", output.backend);
    if output.entries.is_empty() {
        text.push_str("(no configurations)\n");
    }
    for entry in &output.entries {
        let _ = writeln!(text, "{}\t{}", entry.id, entry.name);
    }
    Ok(CliOutput::ok(text))
}
