//! Tool management module
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolPrefilter                              │
//! │    core tools + keyword-matched categories  │
//! └─────────────────────────────────────────────┘
//!           │ reduced ToolDefinition list
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │    name -> (definition, ToolExecutor)       │
//! │    execute: timeout, panic capture,         │
//! │    uniform ToolExecutionResult              │
//! └─────────────────────────────────────────────┘
//! ```

mod executor;
mod prefilter;
mod registry;

pub use executor::{FnExecutor, ToolError, ToolExecutor, ToolResult};
pub use prefilter::{ToolCategory, ToolPrefilter};
pub use registry::ToolRegistry;
