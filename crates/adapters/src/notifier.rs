//! Console notification sink.

use crate::log_sink::{LogSink, StderrLogSink};
use profile_store_ports::{Notification, NotifierPort};
use std::sync::Arc;

/// Writes each notification as one `[severity] message` line.
#[derive(Clone)]
pub struct ConsoleNotifier {
    sink: Arc<dyn LogSink>,
}

impl ConsoleNotifier {
    /// Notifier writing into `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Notifier writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Arc::new(StderrLogSink))
    }
}

impl NotifierPort for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let line = format!(
            "[{}] {}\n",
            notification.severity.as_str(),
            notification.message
        );
        self.sink.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use profile_store_ports::Severity;

    #[test]
    fn formats_severity_prefix() {
        let sink = Arc::new(MemoryLogSink::default());
        let notifier = ConsoleNotifier::new(sink.clone());
        notifier.notify(Notification {
            message: "Configuration saved".into(),
            severity: Severity::Success,
            duration_hint_ms: 2_000,
        });

        assert_eq!(sink.take(), vec!["[success] Configuration saved\n".to_string()]);
    }
}
