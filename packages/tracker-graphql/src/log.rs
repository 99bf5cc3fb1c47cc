use tracing::{error, warn};

/// Sink for the audit lines connection loaders emit on failure.
pub trait ConnectionLog: Send + Sync {
    fn warn(&self, connection: &str, message: &str);

    fn error(&self, connection: &str, message: &str);
}

/// Forwards to `tracing`, tagging each event with the connection name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ConnectionLog for TracingLog {
    fn warn(&self, connection: &str, message: &str) {
        warn!(connection, "{message}");
    }

    fn error(&self, connection: &str, message: &str) {
        error!(connection, "{message}");
    }
}
