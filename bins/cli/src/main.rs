//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{
    SaveInput, run_config_show, run_delete_command, run_list_command, run_repair_command,
    run_save_command, run_schema, run_show_command,
};
use error::{CliError, ExitCode};
use format::{LogFormatArg, OutputArgs, OutputMode};
use profile_store_infra::{
    LOG_LEVEL_ENV, StoreCommandOptions, StoreObservers, build_logger, is_secret_key,
    parse_log_level,
};
use profile_store_shared::{ErrorEnvelope, ErrorKind, REDACTED};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Env var holding the `tracing` filter directive (defaults to `warn`).
const TRACE_FILTER_ENV: &str = "PSTORE_TRACE";

#[derive(Debug, Parser)]
#[command(
    name = "pstore",
    version,
    about = "Assistant configuration store CLI",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Optional config file path (JSON/TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Partial config JSON applied over the config file.
    #[arg(long, global = true)]
    overrides_json: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List configurations on the active backend, sorted by name.
    List,
    /// Save a configuration draft (JSON) read from a file or stdin.
    Save {
        /// Draft file path.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Read the draft from stdin.
        #[arg(long, conflicts_with = "file")]
        stdin: bool,
    },
    /// Show one configuration.
    Show {
        /// Configuration id.
        id: String,
    },
    /// Delete one configuration.
    Delete {
        /// Configuration id.
        id: String,
    },
    /// Rebuild the local index from the stored records.
    Repair,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print the JSON schema of the draft accepted by `save`.
    Schema,
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config (file + overrides + env) as JSON.
    Show,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

impl CliOutput {
    pub(crate) const fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);
    init_tracing(cli.output.log_format);

    match run(&cli, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn init_tracing(format: LogFormatArg) {
    let filter =
        EnvFilter::try_from_env(TRACE_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    // A second init (tests) is harmless.
    let _ = match format {
        LogFormatArg::Text => builder.try_init(),
        LogFormatArg::Json => builder.json().try_init(),
    };
}

fn store_options(cli: &Cli) -> StoreCommandOptions {
    let min_level = parse_log_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    StoreCommandOptions {
        config_path: cli.config.clone(),
        overrides_json: cli.overrides_json.clone(),
        base_dir: None,
        observers: StoreObservers {
            logger: Some(build_logger(cli.output.log_format.into(), min_level)),
            notifier: None,
        },
    }
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    match &cli.command {
        Commands::List => run_list_command(mode, &store_options(cli)),
        Commands::Save { file, stdin } => {
            let input = match (file, *stdin) {
                (Some(path), _) => SaveInput::File(path.clone()),
                (None, true) => SaveInput::Stdin,
                (None, false) => {
                    return Err(CliError::InvalidInput(
                        "missing --file or --stdin".to_string(),
                    ));
                },
            };
            run_save_command(mode, &store_options(cli), &input)
        },
        Commands::Show { id } => run_show_command(mode, &store_options(cli), id),
        Commands::Delete { id } => run_delete_command(mode, &store_options(cli), id),
        Commands::Repair => run_repair_command(mode, &store_options(cli)),
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                run_config_show(mode, cli.config.as_deref(), cli.overrides_json.as_deref())
            },
        },
        Commands::Schema => Ok(run_schema(mode)),
    }
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &ErrorEnvelope,
    exit_code: ExitCode,
) -> CliOutput {
    let error = sanitize_error(error.clone());

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": {
                "code": error.code.to_string(),
                "message": error.message,
                "kind": error.kind.to_string(),
                "class": error.class.to_string(),
                "meta": error.metadata,
            },
        });
        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        format_error_text(&error)
    };

    CliOutput {
        stdout,
        stderr: String::new(),
        exit_code,
    }
}

pub(crate) const fn infra_exit_code(error: &ErrorEnvelope) -> ExitCode {
    match error.kind {
        ErrorKind::Expected => ExitCode::InvalidInput,
        ErrorKind::Invariant | ErrorKind::Unexpected => ExitCode::Internal,
    }
}

pub(crate) fn to_json_output<T: serde::Serialize>(payload: &T) -> Result<String, CliError> {
    let mut output = serde_json::to_string_pretty(payload)?;
    output.push('\n');
    Ok(output)
}

fn sanitize_error(mut error: ErrorEnvelope) -> ErrorEnvelope {
    for (key, value) in &mut error.metadata {
        if is_secret_key(key) {
            *value = REDACTED.to_string();
        }
    }
    error
}

fn format_error_text(error: &ErrorEnvelope) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str(&format!("code: {}\n", error.code));
    out.push_str(&format!("message: {}\n", error.message));
    out.push_str(&format!("kind: {}\n", error.kind));

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str(&format!("  {key}: {value}\n"));
        }
    }

    out
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
