use super::{infra_error_output, parse_id_arg};
use crate::error::CliError;
use crate::format::OutputMode;
use crate::{CliOutput, to_json_output};
use profile_store_infra::{StoreCommandOptions, run_delete};

pub fn run_delete_command(
    mode: OutputMode,
    options: &StoreCommandOptions,
    raw_id: &str,
) -> Result<CliOutput, CliError> {
    let id = match parse_id_arg(mode, raw_id) {
        Ok(id) => id,
        Err(output) => return Ok(output),
    };
    if let Err(error) = run_delete(options, &id) {
        return Ok(infra_error_output(mode, &error));
    }

    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "deleted": id,
        });
        return Ok(CliOutput::ok(to_json_output(&payload)?));
    }
    Ok(CliOutput::ok(format!("status: ok\ndeleted: {id}\n")))
}
