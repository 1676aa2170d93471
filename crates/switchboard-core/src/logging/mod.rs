//! Logging abstractions for runtime-agnostic logging
//!
//! Every component takes an `Arc<dyn Logger>` so the host decides where
//! messages go.

mod traits;
mod console;
mod recording;

pub use traits::{Logger, SharedLogger};
pub use console::{ConsoleLogger, LogLevel, NoOpLogger};
pub use recording::{LogEntry, RecordingLogger};
