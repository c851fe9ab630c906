//! Command handlers. Each returns the full CLI output for one invocation.

mod config;
mod delete;
mod list;
mod repair;
mod save;
mod show;

pub use config::{run_config_show, run_schema};
pub use delete::run_delete_command;
pub use list::run_list_command;
pub use repair::run_repair_command;
pub use save::{SaveInput, run_save_command};
pub use show::run_show_command;

use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, infra_exit_code};
use profile_store_config::parse_config_id;
use profile_store_domain::ConfigId;
use profile_store_shared::ErrorEnvelope;

/// Render an infra error for the current output mode.
pub(crate) fn infra_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    format_error_output(mode, error, infra_exit_code(error))
}

/// Parse a positional id, turning a blank one into an error output.
pub(crate) fn parse_id_arg(mode: OutputMode, raw: &str) -> Result<ConfigId, CliOutput> {
    parse_config_id(raw).map_err(|error| infra_error_output(mode, &error))
}
