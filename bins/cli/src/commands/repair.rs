use super::infra_error_output;
use crate::error::CliError;
use crate::format::OutputMode;
use crate::{CliOutput, to_json_output};
use profile_store_domain::ConfigId;
use profile_store_infra::{StoreCommandOptions, run_repair};
use std::fmt::Write as _;

pub fn run_repair_command(
    mode: OutputMode,
    options: &StoreCommandOptions,
) -> Result<CliOutput, CliError> {
    let report = match run_repair(options) {
        Ok(report) => report,
        Err(error) => return Ok(infra_error_output(mode, &error)),
    };

    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "changed": report.changed(),
            "dropped": report.dropped,
            "adopted": report.adopted,
            "discarded": report.discarded,
            "indexRewritten": report.index_rewritten,
        });
        return Ok(CliOutput::ok(to_json_output(&payload)?));
    }

    let mut text = String::from("status: ok\n");
    push_ids(&mut text, "dropped", &report.dropped);
    push_ids(&mut text, "adopted", &report.adopted);
    push_ids(&mut text, "discarded", &report.discarded);
    let _ = writeln!(text, "indexRewritten: {}", report.index_rewritten);
    Ok(CliOutput::ok(text))
}

fn push_ids(out: &mut String, label: &str, ids: &[ConfigId]) {
    let joined = ids.iter().map(ConfigId::as_str).collect::<Vec<_>>().join(", ");
    let _ = writeln!(out, "{label}: {} [{joined}]", ids.len());
}
