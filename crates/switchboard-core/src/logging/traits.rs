//! Logger trait definition

use std::sync::Arc;

/// Sink for the `[Component] message` lines the router, registry and
/// orchestrator emit
///
/// Implementations:
/// - `NoOpLogger`: drops everything
/// - `ConsoleLogger`: stdout/stderr with a prefix
/// - `RecordingLogger`: keeps entries in memory for assertions
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);

    fn info(&self, message: &str);

    /// Recovered failures: a provider attempt that fell back, a tool that timed out
    fn warn(&self, message: &str);

    /// Turn-fatal failures
    fn error(&self, message: &str);
}

pub type SharedLogger = Arc<dyn Logger>;

/// `log_debug!(logger, "[ToolRegistry] {} tools", n)`
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}
