//! `LoggerPort` adapter forwarding events into `tracing`.

use profile_store_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use profile_store_shared::{REDACTED, is_secret_key};
use serde_json::Value;

/// Logger that re-emits port events as `tracing` events.
///
/// Fields are flattened into one JSON string so subscribers do not need to
/// know the event shape ahead of time.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    base_fields: LogFields,
}

impl TracingLogger {
    /// Create a logger with no base fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let mut fields = self.base_fields.clone();
        fields.extend(event.fields.unwrap_or_default());
        let fields: serde_json::Map<String, Value> = fields
            .into_iter()
            .map(|(key, value)| {
                let value = if is_secret_key(&key) {
                    Value::from(REDACTED)
                } else {
                    value
                };
                (key.into_string(), value)
            })
            .collect();
        let fields = Value::Object(fields).to_string();
        let error_code = event
            .error
            .as_ref()
            .map(|error| error.code.to_string())
            .unwrap_or_default();
        let name = event.event.as_ref();
        let message = event.message.as_ref();

        match event.level {
            LogLevel::Debug => {
                tracing::debug!(event = name, fields = %fields, "{message}");
            },
            LogLevel::Info => {
                tracing::info!(event = name, fields = %fields, "{message}");
            },
            LogLevel::Warn => {
                tracing::warn!(event = name, fields = %fields, error_code = %error_code, "{message}");
            },
            LogLevel::Error => {
                tracing::error!(event = name, fields = %fields, error_code = %error_code, "{message}");
            },
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            base_fields: merged,
        })
    }
}
