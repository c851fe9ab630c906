//! Logger selection for CLI surfaces.

use profile_store_adapters::{JsonLogger, StderrLogSink, TracingLogger};
use profile_store_ports::{LogFields, LogLevel, LoggerPort};
use profile_store_shared::RequestContext;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Env var: minimum level for JSON logs (`debug`, `info`, `warn`, `error`).
pub const LOG_LEVEL_ENV: &str = "PSTORE_LOG_LEVEL";

/// Structured log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Events are forwarded to `tracing`; the subscriber decides rendering.
    #[default]
    Text,
    /// One JSON object per event on stderr.
    Json,
}

impl LogFormat {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Build the logger for `format`.
///
/// `min_level` only applies to JSON output; text output is filtered by the
/// installed `tracing` subscriber.
#[must_use]
pub fn build_logger(format: LogFormat, min_level: LogLevel) -> Arc<dyn LoggerPort> {
    match format {
        LogFormat::Text => Arc::new(TracingLogger::new()),
        LogFormat::Json => {
            Arc::new(JsonLogger::new(Arc::new(StderrLogSink)).with_min_level(min_level))
        },
    }
}

/// Parse a log level name, defaulting to `info`.
#[must_use]
pub fn parse_log_level(raw: Option<&str>) -> LogLevel {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("debug") => LogLevel::Debug,
        Some("warn") => LogLevel::Warn,
        Some("error") => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

/// Child logger tagged with the request's correlation id.
pub fn scope_logger(
    logger: Option<&Arc<dyn LoggerPort>>,
    ctx: &RequestContext,
) -> Option<Arc<dyn LoggerPort>> {
    let logger = logger?;
    let mut fields = LogFields::new();
    fields.insert(
        "correlationId".into(),
        Value::String(ctx.correlation_id().as_str().to_string()),
    );
    Some(Arc::from(logger.child(fields)))
}
